use crate::config::ModelSource;
use crate::constants::{DEFAULT_EMBEDDING_DIM, DEFAULT_MAX_SEQ_LEN};
use crate::embedding::bert::{CONFIG_FILE, WEIGHTS_FILE};
use crate::embedding::error::EmbeddingError;
use crate::embedding::tokenizer::TOKENIZER_FILE;

/// Prefix e5-family models expect in front of search queries.
pub const E5_QUERY_PREFIX: &str = "query: ";

#[derive(Debug, Clone)]
/// Configuration for [`QueryEncoder`](super::QueryEncoder).
pub struct EncoderConfig {
    pub source: ModelSource,
    /// Max tokens fed to the model; longer queries are truncated.
    pub max_seq_len: usize,
    /// Output dimension in stub mode (a loaded model reports its own).
    pub stub_dim: usize,
    /// Prepended to every query before encoding. Empty by default.
    pub query_prefix: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            source: ModelSource::Stub,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            stub_dim: DEFAULT_EMBEDDING_DIM,
            query_prefix: String::new(),
        }
    }
}

impl EncoderConfig {
    pub fn new(source: ModelSource) -> Self {
        Self {
            source,
            ..Default::default()
        }
    }

    pub fn stub() -> Self {
        Self::default()
    }

    pub fn with_query_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.query_prefix = prefix.into();
        self
    }

    /// Checks that a model directory holds every file the encoder loads.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be positive".to_string(),
            });
        }

        match &self.source {
            ModelSource::Stub => {
                if self.stub_dim == 0 {
                    return Err(EmbeddingError::InvalidConfig {
                        reason: "stub_dim must be positive".to_string(),
                    });
                }
                Ok(())
            }
            ModelSource::Directory(dir) => {
                if !dir.is_dir() {
                    return Err(EmbeddingError::ModelNotFound { path: dir.clone() });
                }
                for file in [CONFIG_FILE, WEIGHTS_FILE, TOKENIZER_FILE] {
                    let path = dir.join(file);
                    if !path.exists() {
                        return Err(EmbeddingError::ModelNotFound { path });
                    }
                }
                Ok(())
            }
        }
    }
}
