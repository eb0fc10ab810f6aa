use std::time::Duration;

use tracing::warn;

use crate::TextModel;
use crate::error::AiError;

/// Exponential backoff applied only to rate-limited requests.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl Backoff {
    /// Policy for interactive chat: three attempts, 500 ms then 1 s.
    pub const CHAT: Backoff = Backoff {
        max_attempts: 3,
        initial_delay: Duration::from_millis(500),
    };
}

/// Call the model, retrying with doubling delays while it answers 429.
/// Any other error is returned immediately.
pub async fn generate_with_backoff(
    model: &dyn TextModel,
    prompt: &str,
    backoff: Backoff,
) -> Result<String, AiError> {
    let mut delay = backoff.initial_delay;
    let mut attempt = 1;

    loop {
        match model.generate(prompt).await {
            Err(e) if e.is_rate_limit() && attempt < backoff.max_attempts => {
                warn!(attempt, delay_ms = delay.as_millis() as u64, "model rate limited, backing off");
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            result => return result,
        }
    }
}
