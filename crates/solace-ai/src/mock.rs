//! Deterministic [`TextModel`] for tests: replies are popped from a FIFO
//! queue and every prompt is recorded.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::TextModel;
use crate::error::AiError;

#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, AiError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<Result<String, AiError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.push(Ok(text.into()));
    }

    pub fn push(&self, reply: Result<String, AiError>) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    /// An exhausted queue answers with [`AiError::EmptyResponse`].
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Err(AiError::EmptyResponse))
    }
}
