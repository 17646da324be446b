//! Embedding + model utilities.
//!
//! - [`encoder`] turns query text into search vectors.
//! - [`reranker`] scores (query, passage) pairs with a cross-encoder.
//!
//! Both are CPU-bound and synchronous; async callers should run them under
//! `tokio::task::spawn_blocking`.

/// BERT networks (bi-encoder + cross-encoder head).
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Query encoder.
pub mod encoder;
mod error;
/// Cross-encoder reranker.
pub mod reranker;
/// Tokenizer loading.
pub mod tokenizer;

pub use encoder::{EncoderConfig, QueryEncoder};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use reranker::MockPassageScorer;
pub use reranker::{Reranker, RerankerConfig, RerankerError};

/// Text to vector, for querying the index.
pub trait TextEmbedder: Send + Sync {
    fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn dimension(&self) -> usize;

    fn is_stub(&self) -> bool {
        false
    }
}

/// Relevance of a passage to a query; higher is more relevant.
pub trait PassageScorer: Send + Sync {
    fn score(&self, query: &str, passage: &str) -> Result<f32, RerankerError>;

    fn is_stub(&self) -> bool {
        false
    }
}
