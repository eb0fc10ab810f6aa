use std::sync::Arc;

use solace_ai::TextModel;
use solace_ai::retry::Backoff;
use solace_db::Database;
use tracing::error;

use crate::error::ApiError;
use crate::moderation::ModerationPolicy;
use crate::pending::PendingSubmissions;
use crate::storage::MediaStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub model: Arc<dyn TextModel>,
    pub media: MediaStore,
    pub pending: PendingSubmissions,
    pub moderation: ModerationPolicy,
    pub chat_backoff: Backoff,
}

/// Run a blocking DB closure off the async runtime.
pub async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed: {e}"))
        })?
        .map_err(ApiError::Internal)
}
