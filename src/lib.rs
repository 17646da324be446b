//! Adhikaar library crate (used by the server binary and integration tests).
//!
//! A retrieval-augmented question-answering backend for Nepali law. One
//! request flows through:
//!
//! - [`classifier`]: language detection, category assignment and translation
//!   in a single structured model call.
//! - [`retrieval`]: query embedding, vector top-k and cross-encoder reranking.
//! - [`answer`]: the relevance-gated choice between a context-grounded answer
//!   and the web-search fallback.
//! - [`gateway`]: the Axum HTTP surface.
//!
//! [`assistant::Assistant`] ties these together for one query.
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod answer;
pub mod assistant;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod llm;
pub mod prompts;
pub mod query;
pub mod retrieval;
pub mod vectordb;

pub use answer::{
    Answer, AnswerComposer, AnswerSource, CompositionError, FallbackError, Route,
    WebSearchFallback,
};
pub use assistant::{Assistant, AssistantError, QueryOutcome};
pub use classifier::{ClassificationError, Classifier};
pub use config::{Config, ConfigError, ModelSource, RetrievalFailurePolicy};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use embedding::{
    EmbeddingError, EncoderConfig, PassageScorer, QueryEncoder, Reranker, RerankerConfig,
    RerankerError, TextEmbedder,
};
pub use gateway::{GatewayError, HandlerState, create_router_with_state};
pub use llm::{
    ChatModel, GeminiSearch, LlmError, OpenAiCompatibleChat, UpstreamJsonError, WebSearchModel,
};
pub use prompts::{PROMPT_SET_VERSION, PromptError, PromptKind, PromptSet};
pub use query::{Category, Classification, Language, Query};
pub use retrieval::{Chunk, ChunkSource, RetrievalError, RetrievalPipeline, ScoredChunk};
pub use vectordb::{QdrantClient, SearchResult, VectorDbClient, VectorDbError, VectorPoint};

#[cfg(any(test, feature = "mock"))]
pub use embedding::MockPassageScorer;
#[cfg(any(test, feature = "mock"))]
pub use llm::{MockChatModel, MockWebSearch};
#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockVectorDbClient;
