use std::path::PathBuf;
use thiserror::Error;

/// Failures of the query encoder and the shared BERT/tokenizer loaders.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The configured directory, or one of its weight/tokenizer files, is missing.
    #[error("query encoder files not found at {path}")]
    ModelNotFound { path: PathBuf },

    #[error("query encoder could not be loaded: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("query embedding failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("query tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("invalid query encoder configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        EmbeddingError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for EmbeddingError {
    fn from(err: std::io::Error) -> Self {
        EmbeddingError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}
