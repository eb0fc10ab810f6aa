mod config;

use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use solace_ai::GeminiClient;
use solace_ai::retry::Backoff;
use solace_api::moderation::ModerationPolicy;
use solace_api::pending::PendingSubmissions;
use solace_api::storage::MediaStore;
use solace_api::{AppState, AppStateInner};

use crate::config::Config;

/// How often expired "post anyway" submissions are pruned.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solace=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database and media storage
    let db = solace_db::Database::open(&config.db_path)?;
    let media = MediaStore::new(config.media_dir.clone()).await?;

    let model = GeminiClient::new(&config.ai_api_key, config.ai_model.clone())?
        .with_base_url(config.ai_base_url.clone());
    info!("Using model {}", model.model());

    let pending = PendingSubmissions::new(config.pending_ttl);
    tokio::spawn(pending.clone().run_sweeper(SWEEP_INTERVAL));

    info!("Moderation fail mode: {:?}", config.moderation_fail_mode);

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret,
        model: Arc::new(model),
        media,
        pending,
        moderation: ModerationPolicy {
            fail_mode: config.moderation_fail_mode,
        },
        chat_backoff: Backoff::CHAT,
    });

    let app = solace_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Solace server listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
