//! The user's calendar day. Diary dates are local to the writer, so "today"
//! depends on the UTC offset the client reports.

use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::ApiError;

const MIN_OFFSET_MINUTES: i32 = -12 * 60;
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// `?tz_offset_minutes=` accepted on every date-sensitive route. Missing
/// means UTC; out-of-range values are clamped to real-world offsets.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct ClientClock {
    pub tz_offset_minutes: Option<i32>,
}

impl ClientClock {
    pub fn today(self) -> NaiveDate {
        let offset = self
            .tz_offset_minutes
            .unwrap_or(0)
            .clamp(MIN_OFFSET_MINUTES, MAX_OFFSET_MINUTES);
        (Utc::now() + Duration::minutes(i64::from(offset))).date_naive()
    }

    pub fn is_future(self, date: NaiveDate) -> bool {
        date > self.today()
    }

    /// Reject writes dated after the user's today.
    pub fn ensure_not_future(self, date: NaiveDate) -> Result<(), ApiError> {
        if self.is_future(date) {
            Err(ApiError::FutureDate)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn future_is_relative_to_offset() {
        let clock = ClientClock::default();
        let today = clock.today();
        assert!(!clock.is_future(today));
        assert!(clock.is_future(today + Duration::days(1)));
        assert!(clock.ensure_not_future(today + Duration::days(2)).is_err());
    }

    #[test]
    fn extreme_offsets_are_clamped() {
        let far = ClientClock {
            tz_offset_minutes: Some(100_000),
        };
        let utc_today = Utc::now().date_naive();
        assert!(far.today() <= utc_today + Duration::days(1));
    }
}
