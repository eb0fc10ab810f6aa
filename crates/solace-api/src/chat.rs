use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use solace_ai::prompts;
use solace_ai::retry::generate_with_backoff;
use solace_types::api::{ChatRequest, ChatResponse, Claims};
use solace_types::models::{ChatContext, Conversation};

use crate::convert;
use crate::error::ApiError;
use crate::state::{AppState, run_db};

const MAX_MESSAGE_LEN: usize = 2000;
/// Previous exchanges replayed into the prompt.
const HISTORY_TURNS: u32 = 5;
const MOOD_WINDOW_DAYS: i64 = 14;
const DEFAULT_HISTORY: u32 = 20;
const MAX_HISTORY: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

/// Profile name, recent mood scores and the rolling summary.
async fn load_context(state: &AppState, user_id: Uuid) -> Result<(ChatContext, Vec<(String, String)>), ApiError> {
    let uid = user_id.to_string();
    let to = Utc::now().date_naive();
    let from = to - Duration::days(MOOD_WINDOW_DAYS);

    let (profile, moods, summary, recent) = run_db(state, move |db| {
        Ok((
            db.get_profile(&uid)?,
            db.mood_series(&uid, &from.to_string(), &to.to_string())?,
            db.get_ai_summary(&uid)?,
            db.recent_conversations(&uid, HISTORY_TURNS)?,
        ))
    })
    .await?;

    let context = ChatContext {
        display_name: profile.map(|p| p.display_name),
        recent_moods: moods
            .into_iter()
            .filter_map(|(_, score)| convert::mood(Some(score)))
            .collect(),
        summary: summary.map(|s| s.summary),
    };

    // Oldest first for the prompt
    let history = recent
        .into_iter()
        .rev()
        .map(|c| (c.user_message, c.ai_response))
        .collect();

    Ok((context, history))
}

/// POST /chat. Nothing is stored unless the assistant answers.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = req.message.trim().to_string();
    if message.is_empty() || message.chars().count() > MAX_MESSAGE_LEN {
        return Err(ApiError::BadRequest(format!(
            "message must be 1 to {MAX_MESSAGE_LEN} characters"
        )));
    }

    let (context, history) = load_context(&state, claims.sub).await?;
    let prompt = prompts::chat(&context, &history, &message);

    let reply = generate_with_backoff(state.model.as_ref(), &prompt, state.chat_backoff)
        .await
        .map_err(|e| {
            warn!(user = %claims.sub, error = %e, "chat reply failed");
            if e.is_rate_limit() {
                ApiError::Unavailable("The assistant is busy right now. Please try again in a moment.".into())
            } else {
                ApiError::Unavailable("The assistant is unavailable right now.".into())
            }
        })?;
    let reply = reply.trim().to_string();

    let conversation_id = Uuid::new_v4();
    let id = conversation_id.to_string();
    let uid = claims.sub.to_string();
    let context_json = serde_json::to_string(&context).map_err(anyhow::Error::from)?;
    let (msg, resp) = (message, reply.clone());
    run_db(&state, move |db| db.insert_conversation(&id, &uid, &msg, &resp, &context_json)).await?;

    info!(user = %claims.sub, %conversation_id, "chat exchange stored");
    Ok(Json(ChatResponse { conversation_id, reply }))
}

/// GET /chat/history?limit=. Oldest first.
pub async fn history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY).clamp(1, MAX_HISTORY);
    let uid = claims.sub.to_string();
    let rows = run_db(&state, move |db| db.recent_conversations(&uid, limit)).await?;
    Ok(Json(rows.into_iter().rev().map(convert::conversation).collect()))
}
