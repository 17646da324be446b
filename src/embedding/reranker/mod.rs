//! Cross-encoder reranker.
//!
//! Scores `(query, passage)` pairs jointly. Without a model directory it falls
//! back to a lexical-overlap score so the pipeline stays runnable in tests.

pub mod config;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use config::RerankerConfig;
pub use error::RerankerError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockPassageScorer;

use candle_core::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::config::ModelSource;
use crate::embedding::PassageScorer;
use crate::embedding::bert::{BertClassifier, CONFIG_FILE, WEIGHTS_FILE};
use crate::embedding::device::select_device;
use crate::embedding::tokenizer::load_tokenizer;

pub struct Reranker {
    device: candle_core::Device,
    config: RerankerConfig,
    model: Option<(BertClassifier, Tokenizer)>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.model.is_some())
            .finish()
    }
}

impl Reranker {
    pub fn load(config: RerankerConfig) -> Result<Self, RerankerError> {
        if let Err(msg) = config.validate() {
            return Err(RerankerError::InvalidConfig { reason: msg });
        }

        let model_dir = match &config.source {
            ModelSource::Stub => {
                warn!("Reranker running in STUB mode (lexical overlap scoring)");
                return Ok(Self {
                    device: candle_core::Device::Cpu,
                    config,
                    model: None,
                });
            }
            ModelSource::Directory(dir) => dir.clone(),
        };

        for file in [CONFIG_FILE, WEIGHTS_FILE] {
            let path = model_dir.join(file);
            if !path.exists() {
                return Err(RerankerError::ModelNotFound { path });
            }
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for reranker");

        info!(model_dir = %model_dir.display(), "Loading reranker model");

        let model = BertClassifier::load(&model_dir, &device).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load BERT model: {}", e),
            }
        })?;

        let tokenizer = load_tokenizer(&model_dir, config.max_seq_len).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        info!("Reranker model loaded successfully");

        Ok(Self {
            device,
            config,
            model: Some((model, tokenizer)),
        })
    }

    pub fn stub() -> Result<Self, RerankerError> {
        Self::load(RerankerConfig::stub())
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    pub fn device(&self) -> &candle_core::Device {
        &self.device
    }

    fn score_with_model(
        &self,
        model: &BertClassifier,
        tokenizer: &Tokenizer,
        query: &str,
        passage: &str,
    ) -> Result<f32, RerankerError> {
        let tokens = tokenizer.encode((query, passage), true).map_err(|e| {
            RerankerError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let token_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(tokens.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = model.forward(&token_ids, &type_ids, Some(&attention_mask))?;

        logits
            .flatten_all()?
            .to_vec1::<f32>()?
            .first()
            .copied()
            .ok_or_else(|| RerankerError::InferenceFailed {
                reason: "classifier produced no logits".to_string(),
            })
    }

    fn lexical_score(query: &str, passage: &str) -> f32 {
        use std::collections::HashSet;

        const STOP_WORDS: &[&str] = &[
            "a", "an", "the", "is", "are", "was", "were", "be", "been", "have", "has", "had", "do",
            "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
            "can", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "and",
            "but", "if", "or", "what", "which", "who", "whom", "how", "when", "where", "why",
            "this", "that", "these", "those", "it", "its", "my", "i", "me",
        ];

        let words = |text: &str| -> HashSet<String> {
            text.to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
                .map(str::to_string)
                .collect()
        };

        let query_words = words(query);
        let passage_words = words(passage);

        if query_words.is_empty() {
            return 0.0;
        }

        let matches = query_words.intersection(&passage_words).count();
        let recall = matches as f32 / query_words.len() as f32;

        let union = query_words.union(&passage_words).count();
        let jaccard = if union > 0 {
            matches as f32 / union as f32
        } else {
            0.0
        };

        let base_score = 0.6 * recall + 0.4 * jaccard;

        // Logistic squash so stub scores look like cross-encoder probabilities.
        let normalized = 1.0 / (1.0 + (-8.0 * (base_score - 0.5)).exp());
        normalized.clamp(0.0, 1.0)
    }
}

impl PassageScorer for Reranker {
    fn score(&self, query: &str, passage: &str) -> Result<f32, RerankerError> {
        let score = match &self.model {
            Some((model, tokenizer)) => self.score_with_model(model, tokenizer, query, passage)?,
            None => Self::lexical_score(query, passage),
        };

        debug!(
            query_len = query.len(),
            passage_len = passage.len(),
            score,
            "Scored query-passage pair"
        );

        Ok(score)
    }

    fn is_stub(&self) -> bool {
        self.model.is_none()
    }
}
