use thiserror::Error;

use crate::embedding::{EmbeddingError, RerankerError};
use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
/// Any failure that leaves the pipeline without a trustworthy candidate list.
pub enum RetrievalError {
    #[error("query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector search failed: {0}")]
    VectorStore(#[from] VectorDbError),

    #[error("reranking failed: {0}")]
    Rerank(#[from] RerankerError),

    #[error("query vector has {actual} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("model task aborted: {reason}")]
    Task { reason: String },
}

impl From<tokio::task::JoinError> for RetrievalError {
    fn from(err: tokio::task::JoinError) -> Self {
        RetrievalError::Task {
            reason: err.to_string(),
        }
    }
}
