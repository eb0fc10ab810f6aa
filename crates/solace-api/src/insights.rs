//! Read-only screens built from diary data: dashboard, mood analytics,
//! mood calendar and recommendations. Each falls back to built-in sample
//! or default data when the user has nothing yet.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;
use solace_db::models::SummaryRow;
use tracing::warn;

use solace_types::api::{
    Claims, DashboardResponse, MoodAnalyticsResponse, MoodCalendarResponse, MoodPoint,
    RecommendationsResponse,
};
use solace_types::models::DEFAULT_RECOMMENDATIONS;

use crate::clock::ClientClock;
use crate::convert;
use crate::error::ApiError;
use crate::state::{AppState, run_db};
use crate::stats;

const DEFAULT_DAYS: u32 = 30;
const MAX_DAYS: u32 = 365;
const DASHBOARD_ACHIEVEMENTS: u32 = 3;

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<String>,
}

fn points(series: Vec<(String, i64)>) -> Vec<MoodPoint> {
    series
        .into_iter()
        .filter_map(|(date, score)| {
            convert::mood(Some(score)).map(|score| MoodPoint {
                date: convert::date(&date),
                score,
            })
        })
        .collect()
}

/// Stored recommendations, or the defaults when there are none yet.
fn recommendations_from(row: Option<SummaryRow>) -> RecommendationsResponse {
    let Some(row) = row else {
        return default_recommendations(None);
    };
    let stored: Vec<String> = serde_json::from_str(&row.recommendations).unwrap_or_else(|e| {
        warn!("Corrupt recommendations for user '{}': {}", row.user_id, e);
        Vec::new()
    });
    if stored.is_empty() {
        return default_recommendations(Some(row.summary));
    }
    RecommendationsResponse {
        recommendations: stored,
        summary: Some(row.summary),
        fallback: false,
    }
}

fn default_recommendations(summary: Option<String>) -> RecommendationsResponse {
    RecommendationsResponse {
        recommendations: DEFAULT_RECOMMENDATIONS.iter().map(|r| r.to_string()).collect(),
        summary,
        fallback: true,
    }
}

/// First and last day of a `YYYY-MM` month.
fn month_bounds(month: &str) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").ok()?;
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
    };
    Some((first, next - Duration::days(1)))
}

/// GET /dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(clock): Query<ClientClock>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let today = clock.today();
    let uid = claims.sub.to_string();
    let week_start = (today - Duration::days(6)).to_string();
    let year_start = (today - Duration::days(i64::from(MAX_DAYS))).to_string();
    let end = today.to_string();

    let (profile, count, dates, week, year, achievements, summary) = run_db(&state, move |db| {
        Ok((
            db.get_profile(&uid)?,
            db.count_diary_entries(&uid)?,
            db.list_entry_dates(&uid)?,
            db.mood_series(&uid, &week_start, &end)?,
            db.mood_series(&uid, &year_start, &end)?,
            db.list_achievements(&uid, Some(DASHBOARD_ACHIEVEMENTS))?,
            db.get_ai_summary(&uid)?,
        ))
    })
    .await?;

    let dates: Vec<NaiveDate> = dates.iter().map(|d| convert::date(d)).collect();
    let recommendations = recommendations_from(summary);

    Ok(Json(DashboardResponse {
        display_name: profile.map(|p| p.display_name),
        entry_count: count,
        current_streak: stats::current_streak(&dates, today),
        average_mood_7d: stats::average(&points(week)),
        latest_mood: points(year).pop(),
        recent_achievements: achievements.into_iter().map(convert::achievement).collect(),
        fallback: count == 0 || recommendations.fallback,
        recommendations: recommendations.recommendations,
    }))
}

/// GET /analytics/mood?days= (default 30, at most 365)
pub async fn mood_analytics(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(clock): Query<ClientClock>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<MoodAnalyticsResponse>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_DAYS).clamp(1, MAX_DAYS);
    let today = clock.today();
    let from = (today - Duration::days(i64::from(days) - 1)).to_string();
    let to = today.to_string();

    let uid = claims.sub.to_string();
    let series = points(run_db(&state, move |db| db.mood_series(&uid, &from, &to)).await?);

    let fallback = series.is_empty();
    let series = if fallback {
        stats::sample_series(today, days)
    } else {
        series
    };

    Ok(Json(MoodAnalyticsResponse {
        days,
        average: stats::average(&series),
        min: series.iter().map(|p| p.score).min(),
        max: series.iter().map(|p| p.score).max(),
        trend: stats::trend(&series),
        distribution: stats::distribution(&series),
        series,
        fallback,
    }))
}

/// GET /moods?month=YYYY-MM. Defaults to the current month.
pub async fn mood_calendar(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(clock): Query<ClientClock>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<MoodCalendarResponse>, ApiError> {
    let month = query
        .month
        .unwrap_or_else(|| clock.today().format("%Y-%m").to_string());
    let (first, last) = month_bounds(&month)
        .ok_or_else(|| ApiError::BadRequest("month must be formatted YYYY-MM".into()))?;

    let uid = claims.sub.to_string();
    let (from, to) = (first.to_string(), last.to_string());
    let days = points(run_db(&state, move |db| db.mood_series(&uid, &from, &to)).await?);

    Ok(Json(MoodCalendarResponse {
        month: first.format("%Y-%m").to_string(),
        days,
    }))
}

/// GET /recommendations
pub async fn recommendations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    let uid = claims.sub.to_string();
    let row = run_db(&state, move |db| db.get_ai_summary(&uid)).await?;
    Ok(Json(recommendations_from(row)))
}
