//! Cross-cutting, shared constants.
//!
//! Retrieval sizes and the routing threshold are shared by the pipeline, the
//! composer and the configuration layer, so they live here rather than in any
//! one of them.

/// Dimension of `intfloat/e5-small-v2`, the model the legal corpus was indexed with.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

/// Nearest neighbours requested from the vector store per query.
pub const DEFAULT_CANDIDATE_K: u64 = 10;

/// Chunks kept after cross-encoder reranking.
pub const DEFAULT_RERANKED_N: usize = 5;

/// Vector-similarity score the top chunk must reach before the context path is used.
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 0.70;

/// Upper bound on every outbound LLM call.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 15;

/// Response header carrying the request outcome (`ok`, `degraded`, error codes).
pub const ADHIKAAR_STATUS_HEADER: &str = "X-Adhikaar-Status";
/// Response header carrying the classification category.
pub const ADHIKAAR_CATEGORY_HEADER: &str = "X-Adhikaar-Category";
/// Response header carrying the detected language.
pub const ADHIKAAR_LANGUAGE_HEADER: &str = "X-Adhikaar-Language";
/// Response header carrying the answer source tag.
pub const ADHIKAAR_ANSWER_HEADER: &str = "X-Adhikaar-Answer";

pub const ADHIKAAR_STATUS_HEALTHY: &str = "healthy";
pub const ADHIKAAR_STATUS_READY: &str = "ready";
pub const ADHIKAAR_STATUS_ERROR: &str = "error";

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// Use this at module boundaries to catch a model/index mismatch at start-up
/// instead of on the first search.
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if actual == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DimValidationError {
    #[error("embedding dimension cannot be zero")]
    ZeroDimension,
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
