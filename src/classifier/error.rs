use thiserror::Error;

use crate::llm::{LlmError, UpstreamJsonError};
use crate::prompts::PromptError;

#[derive(Debug, Error)]
/// No category could be assigned; the request cannot proceed.
pub enum ClassificationError {
    #[error("classification prompt could not be rendered: {0}")]
    Prompt(#[from] PromptError),

    #[error("classifier call failed: {0}")]
    Call(#[from] LlmError),

    #[error("classifier output unusable: {0}")]
    Schema(#[from] UpstreamJsonError),
}
