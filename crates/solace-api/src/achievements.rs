use axum::{Extension, Json, extract::State};
use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use solace_types::api::Claims;
use solace_types::models::{Achievement, BadgeKind};

use crate::convert;
use crate::error::ApiError;
use crate::state::{AppState, run_db};
use crate::stats;

/// Badges earned by diary activity so far.
pub fn diary_milestones(entry_count: u32, streak: u32) -> Vec<BadgeKind> {
    let mut badges = Vec::new();
    if entry_count >= 1 {
        badges.push(BadgeKind::FirstEntry);
    }
    if entry_count >= 7 {
        badges.push(BadgeKind::WeekOfEntries);
    }
    if entry_count >= 30 {
        badges.push(BadgeKind::MonthOfEntries);
    }
    if streak >= 7 {
        badges.push(BadgeKind::SevenDayStreak);
    }
    badges
}

/// Insert `badge` unless the user already has it.
pub(crate) async fn award(
    state: &AppState,
    user_id: Uuid,
    badge: BadgeKind,
) -> Result<Option<Achievement>, ApiError> {
    let id = Uuid::new_v4().to_string();
    let uid = user_id.to_string();
    let row = run_db(state, move |db| {
        db.award_achievement(&id, &uid, badge.as_str(), badge.title(), badge.description())
    })
    .await?;

    if row.is_some() {
        info!(user = %user_id, badge = badge.as_str(), "achievement earned");
    }
    Ok(row.map(convert::achievement))
}

/// Award every diary milestone the user has reached. Returns only new badges.
pub(crate) async fn award_diary_milestones(
    state: &AppState,
    user_id: Uuid,
    today: NaiveDate,
) -> Result<Vec<Achievement>, ApiError> {
    let uid = user_id.to_string();
    let (count, dates) = run_db(state, move |db| {
        Ok((db.count_diary_entries(&uid)?, db.list_entry_dates(&uid)?))
    })
    .await?;

    let dates: Vec<NaiveDate> = dates.iter().map(|d| convert::date(d)).collect();
    let streak = stats::current_streak(&dates, today);

    let mut earned = Vec::new();
    for badge in diary_milestones(count, streak) {
        if let Some(achievement) = award(state, user_id, badge).await? {
            earned.push(achievement);
        }
    }
    Ok(earned)
}

/// GET /achievements
pub async fn list_achievements(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Achievement>>, ApiError> {
    let uid = claims.sub.to_string();
    let rows = run_db(&state, move |db| db.list_achievements(&uid, None)).await?;
    Ok(Json(rows.into_iter().map(convert::achievement).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestones_by_count_and_streak() {
        assert!(diary_milestones(0, 0).is_empty());
        assert_eq!(diary_milestones(1, 1), vec![BadgeKind::FirstEntry]);
        assert_eq!(
            diary_milestones(7, 7),
            vec![BadgeKind::FirstEntry, BadgeKind::WeekOfEntries, BadgeKind::SevenDayStreak]
        );
        assert_eq!(diary_milestones(30, 2).len(), 3);
    }
}
