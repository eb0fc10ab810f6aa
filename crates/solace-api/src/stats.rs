//! Pure mood and streak calculations behind the dashboard pages.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use solace_types::api::{MoodDistribution, MoodPoint, MoodTrend};

/// Consecutive days with an entry, counting back from `today`. A streak is
/// still alive if the last entry was yesterday.
pub fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let written: HashSet<NaiveDate> = dates.iter().copied().collect();

    let mut day = if written.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while written.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

pub fn average(series: &[MoodPoint]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let total: u32 = series.iter().map(|p| u32::from(p.score)).sum();
    let avg = f64::from(total) / series.len() as f64;
    Some((avg * 10.0).round() / 10.0)
}

/// Low 1-3, medium 4-6, high 7-10.
pub fn distribution(series: &[MoodPoint]) -> MoodDistribution {
    let mut dist = MoodDistribution::default();
    for point in series {
        match point.score {
            0..=3 => dist.low += 1,
            4..=6 => dist.medium += 1,
            _ => dist.high += 1,
        }
    }
    dist
}

/// Compares the mean of the later half of the series with the earlier half.
pub fn trend(series: &[MoodPoint]) -> MoodTrend {
    if series.len() < 4 {
        return MoodTrend::Unknown;
    }
    let (first, second) = series.split_at(series.len() / 2);
    let (Some(a), Some(b)) = (average(first), average(second)) else {
        return MoodTrend::Unknown;
    };

    let delta = b - a;
    if delta >= 0.5 {
        MoodTrend::Improving
    } else if delta <= -0.5 {
        MoodTrend::Declining
    } else {
        MoodTrend::Steady
    }
}

/// Illustrative series shown to new users who have no scored entries yet.
pub fn sample_series(today: NaiveDate, days: u32) -> Vec<MoodPoint> {
    const PATTERN: [u8; 7] = [5, 6, 5, 7, 6, 7, 8];
    let len = days.min(14);
    (0..len)
        .map(|i| MoodPoint {
            date: today - Duration::days(i64::from(len - 1 - i)),
            score: PATTERN[i as usize % PATTERN.len()],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(scores: &[u8]) -> Vec<MoodPoint> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| MoodPoint {
                date: d("2026-03-01") + Duration::days(i as i64),
                score,
            })
            .collect()
    }

    #[test]
    fn streak_counts_back_from_today_or_yesterday() {
        let dates = [d("2026-03-10"), d("2026-03-09"), d("2026-03-08"), d("2026-03-05")];
        assert_eq!(current_streak(&dates, d("2026-03-10")), 3);
        assert_eq!(current_streak(&dates, d("2026-03-11")), 3);
        assert_eq!(current_streak(&dates, d("2026-03-12")), 0);
        assert_eq!(current_streak(&[], d("2026-03-12")), 0);
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        assert_eq!(average(&series(&[5, 6, 6])), Some(5.7));
        assert_eq!(average(&[]), None);
    }

    #[test]
    fn distribution_buckets() {
        let dist = distribution(&series(&[1, 3, 4, 6, 7, 10]));
        assert_eq!(dist, MoodDistribution { low: 2, medium: 2, high: 2 });
    }

    #[test]
    fn trend_direction() {
        assert_eq!(trend(&series(&[3, 3, 7, 8])), MoodTrend::Improving);
        assert_eq!(trend(&series(&[8, 8, 4, 3])), MoodTrend::Declining);
        assert_eq!(trend(&series(&[5, 6, 6, 5])), MoodTrend::Steady);
        assert_eq!(trend(&series(&[5, 6])), MoodTrend::Unknown);
    }

    #[test]
    fn sample_series_ends_today() {
        let today = d("2026-03-20");
        let sample = sample_series(today, 30);
        assert_eq!(sample.len(), 14);
        assert_eq!(sample.last().unwrap().date, today);
        assert_eq!(sample_series(today, 3).len(), 3);
    }
}
