//! Qdrant vector database integration.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::{QdrantClient, VectorDbClient};
pub use error::VectorDbError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockVectorDbClient, cosine_similarity};
pub use model::{SearchResult, VectorPoint};

/// Payload key holding the passage text.
pub const TEXT_PAYLOAD_KEY: &str = "text";
