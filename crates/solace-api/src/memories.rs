use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use solace_types::api::{Claims, CreateMemoryRequest};
use solace_types::models::Memory;

use crate::clock::ClientClock;
use crate::content;
use crate::convert;
use crate::error::ApiError;
use crate::state::{AppState, run_db};

const MAX_CONTEXT_LEN: usize = 1000;
const MAX_MOOD_LEN: usize = 40;

fn required_text(value: &str, field: &str, max: usize) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(ApiError::BadRequest(format!("{field} must be 1 to {max} characters")));
    }
    Ok(value.to_string())
}

/// POST /memories. Answer to the prompt shown after inserting an image.
pub async fn create_memory(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(clock): Query<ClientClock>,
    Json(req): Json<CreateMemoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    clock.ensure_not_future(req.entry_date)?;

    let context = required_text(&req.context, "context", MAX_CONTEXT_LEN)?;
    let mood = required_text(&req.mood, "mood", MAX_MOOD_LEN)?;
    if req.image_url.trim().is_empty() {
        return Err(ApiError::BadRequest("image_url is required".into()));
    }
    let image_url = content::canonical_image_url(&req.image_url);

    let id = Uuid::new_v4().to_string();
    let uid = claims.sub.to_string();
    let date = req.entry_date.to_string();
    let row = run_db(&state, move |db| {
        if let Some(media_id) = content::media_id(&image_url) {
            let owned = db
                .get_media(&media_id.to_string())?
                .is_some_and(|m| m.user_id == uid);
            if !owned {
                return Ok(None);
            }
        }
        db.insert_memory(&id, &uid, &date, &image_url, &context, &mood)
            .map(Some)
    })
    .await?
    .ok_or(ApiError::NotFound("image"))?;

    Ok((StatusCode::CREATED, Json(convert::memory(row))))
}

/// GET /memories. Newest first.
pub async fn list_memories(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Memory>>, ApiError> {
    let uid = claims.sub.to_string();
    let rows = run_db(&state, move |db| db.list_memories(&uid)).await?;
    Ok(Json(rows.into_iter().map(convert::memory).collect()))
}

/// DELETE /memories/{id}. The image itself stays in the entry.
pub async fn delete_memory(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(memory_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mid = memory_id.to_string();
    let uid = claims.sub.to_string();
    if run_db(&state, move |db| db.delete_memory(&mid, &uid)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("memory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_text_is_required() {
        assert_eq!(required_text(" calm ", "mood", 40).unwrap(), "calm");
        assert!(required_text("", "mood", 40).is_err());
        assert!(required_text(&"a".repeat(41), "mood", 40).is_err());
    }
}
