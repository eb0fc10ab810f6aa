//! Community posts and comments. Every submission is screened before it is
//! stored; see [`crate::moderation`] for the classifier and failure policy.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use solace_types::api::{Claims, CreateCommentRequest, CreatePostRequest, ToggleReactionResponse};
use solace_types::models::{Comment, CommunityPost};
use solace_types::moderation::{
    CommunityItem, ModerationCategory, ModerationRecord, ModerationVerdict, SubmissionOutcome,
};

use crate::convert;
use crate::error::ApiError;
use crate::moderation::{self, HARMFUL_CONTENT_MESSAGE, Screening};
use crate::pending::{CommentDraft, Draft, PostDraft};
use crate::state::{AppState, run_db};

const MAX_CONTENT_LEN: usize = 5000;
const MAX_TAGS: usize = 5;
const MAX_TAG_LEN: usize = 30;
const DEFAULT_PAGE: u32 = 20;
const MAX_PAGE: u32 = 100;

type Submitted = (StatusCode, Json<SubmissionOutcome>);

#[derive(Debug, Deserialize)]
pub struct PostQuery {
    pub limit: Option<u32>,
    pub tag: Option<String>,
}

fn validate_content(content: &str) -> Result<String, ApiError> {
    let content = content.trim();
    if content.is_empty() || content.chars().count() > MAX_CONTENT_LEN {
        return Err(ApiError::BadRequest(format!(
            "content must be 1 to {MAX_CONTENT_LEN} characters"
        )));
    }
    Ok(content.to_string())
}

/// Lowercased, deduplicated, order kept.
fn normalize_tags(tags: Vec<String>) -> Result<Vec<String>, ApiError> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().trim_start_matches('#').to_lowercase();
        if tag.is_empty() || out.contains(&tag) {
            continue;
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(ApiError::BadRequest(format!("tags must be at most {MAX_TAG_LEN} characters")));
        }
        out.push(tag);
    }
    if out.len() > MAX_TAGS {
        return Err(ApiError::BadRequest(format!("at most {MAX_TAGS} tags per post")));
    }
    Ok(out)
}

/// Public name for a submission: the profile's display name, falling back
/// to the username. Anonymous submissions carry no name at all.
async fn public_name(state: &AppState, claims: &Claims, anonymous: bool) -> Result<Option<String>, ApiError> {
    if anonymous {
        return Ok(None);
    }
    let uid = claims.sub.to_string();
    let profile = run_db(state, move |db| db.get_profile(&uid)).await?;
    Ok(Some(
        profile
            .map(|p| p.display_name)
            .unwrap_or_else(|| claims.username.clone()),
    ))
}

/// POST /community/posts
pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePostRequest>,
) -> Result<Submitted, ApiError> {
    let content = validate_content(&req.content)?;
    let tags = normalize_tags(req.tags)?;
    let author_name = public_name(&state, &claims, req.anonymous).await?;

    let draft = Draft::Post(PostDraft {
        author_name,
        content,
        tags,
    });
    submit(&state, claims.sub, draft, None).await
}

/// POST /community/posts/{id}/comments. The parent post is given to the
/// classifier as context.
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<Submitted, ApiError> {
    let content = validate_content(&req.content)?;

    let pid = post_id.to_string();
    let parent = req.parent_comment_id.map(|id| id.to_string());
    let (post, parent_comment) = run_db(&state, move |db| {
        let post = db.get_post(&pid)?;
        let parent_comment = match parent {
            Some(id) => db.get_comment(&id)?,
            None => None,
        };
        Ok((post, parent_comment))
    })
    .await?;

    let post = post.ok_or(ApiError::NotFound("post"))?;
    if req.parent_comment_id.is_some() {
        let belongs = parent_comment.is_some_and(|c| c.post_id == post.id);
        if !belongs {
            return Err(ApiError::BadRequest("parent comment is not on this post".into()));
        }
    }

    let author_name = public_name(&state, &claims, req.anonymous).await?;
    let draft = Draft::Comment(CommentDraft {
        post_id,
        parent_comment_id: req.parent_comment_id,
        author_name,
        content,
    });
    submit(&state, claims.sub, draft, Some(post.content)).await
}

/// Screen a draft and act on the verdict.
async fn submit(
    state: &AppState,
    user_id: Uuid,
    draft: Draft,
    context: Option<String>,
) -> Result<Submitted, ApiError> {
    let screening = moderation::screen(
        state.model.as_ref(),
        state.moderation,
        draft.content(),
        context.as_deref(),
    )
    .await;

    let verdict = match screening {
        Screening::Verdict(v) => v,
        Screening::Unavailable => return Err(ApiError::ModerationUnavailable),
    };

    match verdict.category {
        ModerationCategory::UrgentRisk => {
            warn!(user = %user_id, "submission blocked as urgent risk");
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(SubmissionOutcome::Blocked {
                    reason: verdict.reason,
                    crisis_resources: moderation::crisis_resources(),
                }),
            ))
        }
        ModerationCategory::HarmfulInstruction => {
            warn!(user = %user_id, reason = %verdict.reason, "submission rejected as harmful");
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(SubmissionOutcome::Rejected {
                    message: HARMFUL_CONTENT_MESSAGE.to_string(),
                }),
            ))
        }
        ModerationCategory::SupportNeeded => {
            let message = moderation::support_message(state.model.as_ref(), draft.content()).await;
            let reason = verdict.reason.clone();
            let submission_id = state.pending.hold(user_id, draft, verdict).await;
            info!(user = %user_id, %submission_id, "submission held for confirmation");
            Ok((
                StatusCode::ACCEPTED,
                Json(SubmissionOutcome::NeedsConfirmation {
                    submission_id,
                    message,
                    reason,
                }),
            ))
        }
        ModerationCategory::Safe => {
            let item = publish(state, user_id, draft, verdict, false).await?;
            Ok((StatusCode::CREATED, Json(SubmissionOutcome::Published { item })))
        }
    }
}

/// Store a screened draft with its moderation record.
async fn publish(
    state: &AppState,
    user_id: Uuid,
    draft: Draft,
    verdict: ModerationVerdict,
    confirmed_by_user: bool,
) -> Result<CommunityItem, ApiError> {
    let record = ModerationRecord {
        category: verdict.category,
        reason: verdict.reason,
        checked_at: Utc::now(),
        confirmed_by_user,
    };
    let moderation = serde_json::to_string(&record).map_err(anyhow::Error::from)?;
    let id = Uuid::new_v4().to_string();
    let uid = user_id.to_string();

    match draft {
        Draft::Post(post) => {
            let tags = serde_json::to_string(&post.tags).map_err(anyhow::Error::from)?;
            let row = run_db(state, move |db| {
                db.insert_post(
                    &id,
                    Some(&uid),
                    post.author_name.as_deref(),
                    &post.content,
                    &tags,
                    &moderation,
                )
            })
            .await?;
            info!(user = %user_id, post = %row.id, confirmed_by_user, "post published");
            Ok(CommunityItem::Post(convert::post(row, user_id)))
        }
        Draft::Comment(comment) => {
            let pid = comment.post_id.to_string();
            let parent = comment.parent_comment_id.map(|p| p.to_string());
            let row = run_db(state, move |db| {
                if db.get_post(&pid)?.is_none() {
                    return Ok(None);
                }
                db.insert_comment(
                    &id,
                    &pid,
                    Some(&uid),
                    comment.author_name.as_deref(),
                    &comment.content,
                    parent.as_deref(),
                    &moderation,
                )
                .map(Some)
            })
            .await?
            .ok_or(ApiError::NotFound("post"))?;
            info!(user = %user_id, comment = %row.id, confirmed_by_user, "comment published");
            Ok(CommunityItem::Comment(convert::comment(row, user_id)))
        }
    }
}

/// POST /community/submissions/{id}/confirm ("post anyway"). Single use.
pub async fn confirm_submission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(submission_id): Path<Uuid>,
) -> Result<Submitted, ApiError> {
    let pending = state
        .pending
        .take(submission_id, claims.sub)
        .await
        .ok_or(ApiError::NotFound("submission"))?;

    let item = publish(&state, claims.sub, pending.draft, pending.verdict, true).await?;
    Ok((StatusCode::CREATED, Json(SubmissionOutcome::Published { item })))
}

/// DELETE /community/submissions/{id}
pub async fn discard_submission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(submission_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.pending.discard(submission_id, claims.sub).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("submission"))
    }
}

/// GET /community/posts?limit=&tag=. Newest first.
pub async fn list_posts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PostQuery>,
) -> Result<Json<Vec<CommunityPost>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
    let tag = query
        .tag
        .map(|t| t.trim().trim_start_matches('#').to_lowercase())
        .filter(|t| !t.is_empty());

    let rows = run_db(&state, move |db| db.list_posts(limit, tag.as_deref())).await?;
    Ok(Json(rows.into_iter().map(|r| convert::post(r, claims.sub)).collect()))
}

/// GET /community/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<CommunityPost>, ApiError> {
    let pid = post_id.to_string();
    let row = run_db(&state, move |db| db.get_post(&pid))
        .await?
        .ok_or(ApiError::NotFound("post"))?;
    Ok(Json(convert::post(row, claims.sub)))
}

/// GET /community/posts/{id}/comments. Oldest first; replies point at
/// their parent via `parent_comment_id`.
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let pid = post_id.to_string();
    let rows = run_db(&state, move |db| {
        if db.get_post(&pid)?.is_none() {
            return Ok(None);
        }
        db.list_comments(&pid).map(Some)
    })
    .await?
    .ok_or(ApiError::NotFound("post"))?;
    Ok(Json(rows.into_iter().map(|r| convert::comment(r, claims.sub)).collect()))
}

/// POST /community/posts/{id}/reactions. Toggles the caller's reaction.
pub async fn toggle_reaction(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<ToggleReactionResponse>, ApiError> {
    let pid = post_id.to_string();
    let uid = claims.sub.to_string();
    let (added, count) = run_db(&state, move |db| {
        if db.get_post(&pid)?.is_none() {
            return Ok(None);
        }
        db.toggle_post_reaction(&pid, &uid).map(Some)
    })
    .await?
    .ok_or(ApiError::NotFound("post"))?;

    Ok(Json(ToggleReactionResponse {
        added,
        reaction_count: count.max(0) as u32,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_normalized() {
        let tags = normalize_tags(vec!["#Anxiety".into(), "anxiety".into(), " sleep ".into(), "".into()]).unwrap();
        assert_eq!(tags, vec!["anxiety", "sleep"]);
    }

    #[test]
    fn too_many_tags() {
        let tags = (0..6).map(|i| format!("t{i}")).collect();
        assert!(normalize_tags(tags).is_err());
    }

    #[test]
    fn content_bounds() {
        assert!(validate_content("   ").is_err());
        assert_eq!(validate_content(" hi ").unwrap(), "hi");
        assert!(validate_content(&"a".repeat(MAX_CONTENT_LEN + 1)).is_err());
    }
}
