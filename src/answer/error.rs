use thiserror::Error;

use crate::llm::{LlmError, UpstreamJsonError};
use crate::prompts::PromptError;

#[derive(Debug, Error)]
/// The web-search fallback produced nothing usable. Terminal: there is no
/// further fallback.
pub enum FallbackError {
    #[error("web search prompt could not be rendered: {0}")]
    Prompt(#[from] PromptError),

    #[error("web search call failed: {0}")]
    Call(#[from] LlmError),

    #[error("web search output is not a valid answer: {0}")]
    Schema(#[from] UpstreamJsonError),
}

#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("answer prompt could not be rendered: {0}")]
    Prompt(#[from] PromptError),

    #[error("answer model call failed: {0}")]
    Call(#[from] LlmError),

    #[error(transparent)]
    Fallback(#[from] FallbackError),
}
