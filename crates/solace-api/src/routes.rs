use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
};
use serde_json::{Value, json};

use crate::media::MAX_IMAGE_SIZE;
use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{achievements, auth, chat, community, diary, insights, media, memories, profiles};

/// All HTTP routes. `/auth/*` and `/health` are public; everything else
/// requires a bearer token.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        // Profile & onboarding
        .route(
            "/profile",
            post(profiles::create_profile)
                .get(profiles::get_profile)
                .patch(profiles::update_profile),
        )
        .route("/achievements", get(achievements::list_achievements))
        // Diary
        .route("/diary", get(diary::list_entries))
        .route("/diary/{date}", get(diary::get_page).put(diary::save_entry))
        .route(
            "/media",
            post(media::upload_media).layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE)),
        )
        .route("/media/{media_id}", get(media::get_media).delete(media::delete_media))
        .route("/memories", get(memories::list_memories).post(memories::create_memory))
        .route("/memories/{memory_id}", delete(memories::delete_memory))
        // Insights
        .route("/dashboard", get(insights::dashboard))
        .route("/analytics/mood", get(insights::mood_analytics))
        .route("/moods", get(insights::mood_calendar))
        .route("/recommendations", get(insights::recommendations))
        // Community
        .route("/community/posts", get(community::list_posts).post(community::create_post))
        .route("/community/posts/{post_id}", get(community::get_post))
        .route(
            "/community/posts/{post_id}/comments",
            get(community::list_comments).post(community::create_comment),
        )
        .route("/community/posts/{post_id}/reactions", post(community::toggle_reaction))
        .route(
            "/community/submissions/{submission_id}",
            delete(community::discard_submission),
        )
        .route(
            "/community/submissions/{submission_id}/confirm",
            post(community::confirm_submission),
        )
        // Chat
        .route("/chat", post(chat::send_message))
        .route("/chat/history", get(chat::history))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
