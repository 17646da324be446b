//! Hosted model clients.
//!
//! - [`ChatModel`]: OpenAI-compatible chat completions (classification, answers, repairs).
//! - [`WebSearchModel`]: a search-grounded model used as the last-resort answerer.
//!
//! Both are object-safe so the pipeline can hold `Arc<dyn ...>` handles and
//! tests can swap in the mocks.

pub mod chat;
pub mod error;
pub mod json;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod search;


pub use chat::OpenAiCompatibleChat;
pub use error::{LlmError, UpstreamJsonError};
pub use json::{parse_or_repair, parse_strict, strip_code_fences};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockChatModel, MockWebSearch};
pub use search::GeminiSearch;

use async_trait::async_trait;

/// Sampling temperature for every structured call.
pub const STRUCTURED_TEMPERATURE: f32 = 0.2;
/// Completion budget for classification (and its repair).
pub const CLASSIFY_MAX_TOKENS: u32 = 100;
/// Completion budget for answers (and their repair).
pub const ANSWER_MAX_TOKENS: u32 = 600;

/// One single-turn completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: STRUCTURED_TEMPERATURE,
            max_tokens,
        }
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the assistant message text (trimmed, non-empty).
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError>;

    fn model(&self) -> &str;
}

#[async_trait]
pub trait WebSearchModel: Send + Sync {
    /// Returns the model's text answer to a single-shot prompt.
    async fn search(&self, prompt: &str) -> Result<String, LlmError>;

    fn model(&self) -> &str;
}
