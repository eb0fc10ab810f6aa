use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model rate limited the request")]
    RateLimited,

    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("could not parse model output: {0}")]
    Parse(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl AiError {
    /// Whether a retry with backoff may succeed.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}
