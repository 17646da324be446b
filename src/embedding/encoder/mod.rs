//! Query encoder (BERT bi-encoder + tokenizer).
//!
//! Use [`EncoderConfig::stub`] for tests and local runs without model files.

pub mod config;

#[cfg(test)]
mod tests;

pub use config::{E5_QUERY_PREFIX, EncoderConfig};

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::config::ModelSource;
use crate::embedding::TextEmbedder;
use crate::embedding::bert::BertEncoder;
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::tokenizer::load_tokenizer;

enum EncoderBackend {
    Model {
        model: BertEncoder,
        tokenizer: Tokenizer,
        device: Device,
    },
    Stub {
        dim: usize,
    },
}

/// Turns query text into a unit-length vector comparable with the indexed corpus.
pub struct QueryEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
}

impl std::fmt::Debug for QueryEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Stub { dim } => format!("Stub(dim={})", dim),
                },
            )
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl QueryEncoder {
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let dir = match &config.source {
            ModelSource::Stub => {
                warn!("Query encoder running in STUB mode (testing only)");
                return Ok(Self {
                    backend: EncoderBackend::Stub {
                        dim: config.stub_dim,
                    },
                    config,
                });
            }
            ModelSource::Directory(dir) => dir.clone(),
        };

        let device = select_device()?;
        debug!(?device, "Selected compute device for query encoder");

        let model =
            BertEncoder::load(&dir, &device).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT encoder: {}", e),
            })?;
        let tokenizer = load_tokenizer(&dir, config.max_seq_len).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        info!(
            model_dir = %dir.display(),
            embedding_dim = model.hidden_size(),
            max_seq_len = config.max_seq_len,
            "Query encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model,
                tokenizer,
                device,
            },
            config,
        })
    }

    pub fn stub() -> Result<Self, EmbeddingError> {
        Self::load(EncoderConfig::stub())
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    fn encode_with_model(
        &self,
        text: &str,
        model: &BertEncoder,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        if encoding.get_ids().is_empty() {
            return Ok(vec![0.0; model.hidden_size()]);
        }

        debug!(
            text_len = text.len(),
            token_count = encoding.get_ids().len(),
            "Encoding query"
        );

        let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

        let pooled = model.embed(&input_ids, &type_ids, &attention_mask)?;
        Ok(normalize(pooled))
    }

    /// Hash-seeded pseudo-random unit vector; identical text gives identical vectors.
    fn encode_stub(&self, text: &str, dim: usize) -> Vec<f32> {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish();

        let raw = (0..dim)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect();

        normalize(raw)
    }
}

impl TextEmbedder for QueryEncoder {
    fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let prefixed = format!("{}{}", self.config.query_prefix, text.trim());

        match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.encode_with_model(&prefixed, model, tokenizer, device),
            EncoderBackend::Stub { dim } => Ok(self.encode_stub(&prefixed, *dim)),
        }
    }

    fn dimension(&self) -> usize {
        match &self.backend {
            EncoderBackend::Model { model, .. } => model.hidden_size(),
            EncoderBackend::Stub { dim } => *dim,
        }
    }

    fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub { .. })
    }
}

/// Scales `v` to unit L2 norm (zero vectors are returned unchanged).
pub fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}
