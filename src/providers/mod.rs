mod fallback;
mod open_ai;
pub mod prompt;

pub use fallback::{Completion, FallbackProvider, ModelRotation};
pub use open_ai::OpenAIProvider;

use crate::error::BoxError;
use async_trait::async_trait;
use serde::Serialize;

/// One chat message sent to a completion endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Model-independent part of a completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    /// Single user message with the given generation parameters
    pub fn from_prompt(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        CompletionRequest {
            messages: vec![ChatMessage::user(prompt)],
            max_tokens,
            temperature,
        }
    }
}

/// Unified trait for chat-completion backends
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai")
    fn provider_name(&self) -> &str;

    /// Run one completion against `model` and return the first choice's content
    async fn complete(&self, model: &str, request: &CompletionRequest)
        -> Result<String, BoxError>;
}
