use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use tracing::{error, info};
use uuid::Uuid;

use solace_types::api::{Claims, DeleteMediaResponse, UploadMediaResponse};

use crate::content;
use crate::error::ApiError;
use crate::state::{AppState, run_db};

/// 10 MB upload limit for diary images
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

const ALLOWED_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

fn image_content_type(headers: &HeaderMap) -> Result<String, ApiError> {
    let raw = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::UnsupportedMedia)?;
    // Drop parameters such as "; charset=..."
    let mime = raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    if ALLOWED_TYPES.contains(&mime.as_str()) {
        Ok(mime)
    } else {
        Err(ApiError::UnsupportedMedia)
    }
}

/// POST /media. Raw image bytes in the body. The response always asks the
/// client to prompt once for the image's memory.
pub async fn upload_media(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let content_type = image_content_type(&headers)?;

    if bytes.is_empty() {
        return Err(ApiError::BadRequest("empty upload".into()));
    }
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ApiError::PayloadTooLarge);
    }

    let media_id = Uuid::new_v4();
    let size = bytes.len() as i64;

    state.media.save(media_id, &bytes).await?;

    let mid = media_id.to_string();
    let uid = claims.sub.to_string();
    let ct = content_type.clone();
    if let Err(e) = run_db(&state, move |db| db.insert_media(&mid, &uid, &ct, size)).await {
        // Don't leave an orphaned file behind
        if let Err(cleanup) = state.media.delete(media_id).await {
            error!("Failed to clean up media {} after DB error: {}", media_id, cleanup);
        }
        return Err(e);
    }

    info!("Stored image {} ({} bytes, {})", media_id, size, content_type);

    Ok((
        StatusCode::CREATED,
        Json(UploadMediaResponse {
            id: media_id,
            url: content::media_url(media_id),
            size: size as u64,
            memory_prompt: true,
        }),
    ))
}

/// GET /media/{id}. Owner only.
pub async fn get_media(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(media_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mid = media_id.to_string();
    let row = run_db(&state, move |db| db.get_media(&mid))
        .await?
        .filter(|row| row.user_id == claims.sub.to_string())
        .ok_or(ApiError::NotFound("image"))?;

    let bytes = state.media.read(media_id).await.map_err(|e| {
        error!("Media {} has a row but no readable file: {}", media_id, e);
        ApiError::NotFound("image")
    })?;

    Ok(([(header::CONTENT_TYPE, row.content_type)], bytes))
}

/// DELETE /media/{id}
pub async fn delete_media(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(media_id): Path<Uuid>,
) -> Result<Json<DeleteMediaResponse>, ApiError> {
    let removed_memories = remove_image(&state, claims.sub, &content::media_url(media_id))
        .await?
        .ok_or(ApiError::NotFound("image"))?;
    Ok(Json(DeleteMediaResponse { removed_memories }))
}

/// Remove an image the user no longer wants: every memory pointing at it,
/// then, for uploaded images, the media row and the stored file.
///
/// Returns `None` when `url` names an upload the user does not own.
pub(crate) async fn remove_image(
    state: &AppState,
    user_id: Uuid,
    url: &str,
) -> Result<Option<usize>, ApiError> {
    let canonical = content::canonical_image_url(url);
    let media_id = content::media_id(&canonical);
    let uid = user_id.to_string();

    let outcome = run_db(state, move |db| {
        if let Some(id) = media_id {
            let id = id.to_string();
            let owned = db.get_media(&id)?.is_some_and(|row| row.user_id == uid);
            if !owned {
                return Ok(None);
            }
            let removed = db.delete_memories_by_image(&uid, &canonical)?;
            db.delete_media(&id, &uid)?;
            Ok(Some(removed))
        } else {
            db.delete_memories_by_image(&uid, &canonical).map(Some)
        }
    })
    .await?;

    if let (Some(removed), Some(id)) = (outcome, media_id) {
        state.media.delete(id).await?;
        info!("Removed image {} and {} linked memories", id, removed);
    }
    Ok(outcome)
}
