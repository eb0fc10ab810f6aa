//! Diary pages: one per user per day, saved as editor HTML.
//!
//! Saving runs a short pipeline. Only the upsert itself can fail the
//! request; image cleanup, memory linking, badges, sentiment and the
//! rolling summary are best-effort and surface as `warnings`.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use solace_ai::parse::{self, SentimentReading};
use solace_ai::prompts;
use solace_types::api::{Claims, DiaryPageResponse, SaveDiaryRequest, SaveDiaryResponse};
use solace_types::models::{Achievement, DiaryEntry};

use crate::achievements;
use crate::clock::ClientClock;
use crate::content;
use crate::convert;
use crate::error::{ApiError, FUTURE_DATE_NOTICE};
use crate::media;
use crate::state::{AppState, run_db};

/// 1 MB of HTML per page; images are stored separately
const MAX_CONTENT_LEN: usize = 1024 * 1024;

/// Plain-text characters sent to the model per entry.
const MAX_MODEL_TEXT: usize = 8000;

#[derive(Debug, Deserialize)]
pub struct EntryRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// GET /diary/{date}. The page or an empty draft. Future pages are
/// read-only and carry the notice the editor displays.
pub async fn get_page(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(date): Path<NaiveDate>,
    Query(clock): Query<ClientClock>,
) -> Result<Json<DiaryPageResponse>, ApiError> {
    let uid = claims.sub.to_string();
    let day = date.to_string();
    let (entry, memories) = run_db(&state, move |db| {
        Ok((db.get_diary_entry(&uid, &day)?, db.list_memories_for_date(&uid, &day)?))
    })
    .await?;

    let future = clock.is_future(date);
    Ok(Json(DiaryPageResponse {
        date,
        editable: !future,
        notice: future.then(|| FUTURE_DATE_NOTICE.to_string()),
        entry: entry.map(convert::diary_entry),
        memories: memories.into_iter().map(convert::memory).collect(),
    }))
}

/// GET /diary?from=&to=. Oldest first.
pub async fn list_entries(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(range): Query<EntryRange>,
) -> Result<Json<Vec<DiaryEntry>>, ApiError> {
    if let (Some(from), Some(to)) = (range.from, range.to) {
        if from > to {
            return Err(ApiError::BadRequest("`from` must not be after `to`".into()));
        }
    }
    let uid = claims.sub.to_string();
    let from = range.from.map(|d| d.to_string());
    let to = range.to.map(|d| d.to_string());
    let rows = run_db(&state, move |db| {
        db.list_diary_entries(&uid, from.as_deref(), to.as_deref())
    })
    .await?;
    Ok(Json(rows.into_iter().map(convert::diary_entry).collect()))
}

/// PUT /diary/{date}
pub async fn save_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(date): Path<NaiveDate>,
    Query(clock): Query<ClientClock>,
    Json(req): Json<SaveDiaryRequest>,
) -> Result<Json<SaveDiaryResponse>, ApiError> {
    clock.ensure_not_future(date)?;
    if req.content.len() > MAX_CONTENT_LEN {
        return Err(ApiError::PayloadTooLarge);
    }

    let user_id = claims.sub;
    let uid = user_id.to_string();
    let day = date.to_string();
    let new_id = Uuid::new_v4().to_string();
    let html = req.content.clone();
    let saved = run_db(&state, move |db| db.upsert_diary_entry(&new_id, &uid, &day, &html)).await?;
    info!(user = %user_id, %date, "diary entry saved");

    let mut entry = convert::diary_entry(saved.entry);
    let mut warnings = Vec::new();

    let removed_images = match &saved.previous_content {
        Some(previous) => {
            remove_dropped_images(&state, user_id, date, previous, &req.content, &mut warnings).await
        }
        None => Vec::new(),
    };

    let linked_memories = match link_memories(&state, user_id, date, entry.id).await {
        Ok(n) => n,
        Err(e) => {
            warn!(user = %user_id, %date, error = %e, "memory linking failed");
            warnings.push("Memories for this day could not be linked.".to_string());
            0
        }
    };

    let new_achievements: Vec<Achievement> =
        match achievements::award_diary_milestones(&state, user_id, clock.today()).await {
            Ok(earned) => earned,
            Err(e) => {
                warn!(user = %user_id, error = %e, "achievement check failed");
                warnings.push("Achievements could not be updated.".to_string());
                Vec::new()
            }
        };

    let text = content::plain_text(&req.content).unwrap_or_else(|e| {
        warn!(user = %user_id, %date, error = %e, "could not extract entry text");
        warnings.push("Mood analysis is unavailable right now.".to_string());
        String::new()
    });
    let text = content::truncate_chars(&text, MAX_MODEL_TEXT);
    if !text.is_empty() {
        match analyse_sentiment(&state, entry.id, text).await {
            Ok(reading) => {
                entry.mood_score = Some(reading.score);
                entry.ai_analysis = reading.analysis;
            }
            Err(e) => {
                warn!(user = %user_id, %date, error = %e, "sentiment analysis failed");
                warnings.push("Mood analysis is unavailable right now.".to_string());
            }
        }

        if let Err(e) = refresh_summary(&state, user_id, text, entry.mood_score).await {
            warn!(user = %user_id, error = %e, "summary refresh failed");
            warnings.push("Recommendations could not be refreshed.".to_string());
        }
    }

    Ok(Json(SaveDiaryResponse {
        entry,
        removed_images,
        linked_memories,
        new_achievements,
        warnings,
    }))
}

/// Remove every image present in `previous` but gone from `current`.
/// An upload still embedded on another day's page keeps its asset; only
/// this day's memories of it go.
async fn remove_dropped_images(
    state: &AppState,
    user_id: Uuid,
    date: NaiveDate,
    previous: &str,
    current: &str,
    warnings: &mut Vec<String>,
) -> Vec<String> {
    let mut removed = Vec::new();
    for url in content::removed_images(previous, current) {
        let outcome = match shared_elsewhere(state, user_id, date, &url).await {
            Ok(true) => forget_on_day(state, user_id, date, &url).await.map(|_| None),
            Ok(false) => media::remove_image(state, user_id, &url).await.map(|r| r.map(|_| ())),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(Some(())) => removed.push(url),
            Ok(None) => info!(user = %user_id, %url, "dropped image kept"),
            Err(e) => {
                warn!(user = %user_id, %url, error = %e, "image cleanup failed");
                warnings.push(format!("Could not remove image {url}."));
            }
        }
    }
    removed
}

/// Whether an uploaded image is still on one of the user's other pages.
async fn shared_elsewhere(state: &AppState, user_id: Uuid, date: NaiveDate, url: &str) -> Result<bool, ApiError> {
    let Some(media_id) = content::media_id(url) else {
        return Ok(false);
    };
    let uid = user_id.to_string();
    let needle = content::media_url(media_id);
    let day = date.to_string();
    run_db(state, move |db| db.image_on_other_pages(&uid, &needle, &day)).await
}

async fn forget_on_day(state: &AppState, user_id: Uuid, date: NaiveDate, url: &str) -> Result<usize, ApiError> {
    let uid = user_id.to_string();
    let canonical = content::canonical_image_url(url);
    let day = date.to_string();
    run_db(state, move |db| db.delete_memories_by_image_on(&uid, &canonical, &day)).await
}

async fn link_memories(
    state: &AppState,
    user_id: Uuid,
    date: NaiveDate,
    entry_id: Uuid,
) -> Result<usize, ApiError> {
    let uid = user_id.to_string();
    let day = date.to_string();
    let eid = entry_id.to_string();
    run_db(state, move |db| db.link_memories_to_entry(&uid, &day, &eid)).await
}

async fn analyse_sentiment(
    state: &AppState,
    entry_id: Uuid,
    text: &str,
) -> anyhow::Result<SentimentReading> {
    let raw = state.model.generate(&prompts::sentiment(text)).await?;
    let reading = parse::sentiment(&raw)?;

    let eid = entry_id.to_string();
    let score = i64::from(reading.score);
    let analysis = reading.analysis.clone();
    run_db(state, move |db| db.set_diary_analysis(&eid, score, analysis.as_deref())).await?;
    Ok(reading)
}

/// Fold the entry into the user's rolling summary and replace their
/// recommendation list.
async fn refresh_summary(
    state: &AppState,
    user_id: Uuid,
    text: &str,
    mood_score: Option<u8>,
) -> anyhow::Result<()> {
    let uid = user_id.to_string();
    let previous = run_db(state, move |db| db.get_ai_summary(&uid))
        .await?
        .map(|row| row.summary);

    let prompt = prompts::summary_update(previous.as_deref(), text, mood_score);
    let raw = state.model.generate(&prompt).await?;
    let update = parse::summary_update(&raw)?;

    let recommendations = serde_json::to_string(&update.recommendations)?;
    let uid = user_id.to_string();
    run_db(state, move |db| db.upsert_ai_summary(&uid, &update.summary, &recommendations)).await?;
    Ok(())
}
