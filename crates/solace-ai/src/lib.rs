//! Generative-text seam: the [`TextModel`] trait, a Gemini HTTP client,
//! prompt builders and parsers for the model's replies.

pub mod client;
pub mod error;
pub mod mock;
pub mod parse;
pub mod prompts;
pub mod retry;
mod types;

use async_trait::async_trait;

pub use client::GeminiClient;
pub use error::AiError;

/// A text-in, text-out generative model.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// One request, no retries.
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}
