//! Language detection, categorisation and translation in one model call.

mod error;


pub use error::ClassificationError;

use std::sync::Arc;
use tracing::{info, instrument};

use crate::llm::{CLASSIFY_MAX_TOKENS, ChatModel, ChatRequest, LlmError, parse_or_repair};
use crate::prompts::{PromptKind, PromptSet};
use crate::query::{Classification, Query};

#[derive(Clone)]
pub struct Classifier {
    model: Arc<dyn ChatModel>,
    prompts: Arc<PromptSet>,
}

impl Classifier {
    pub fn new(model: Arc<dyn ChatModel>, prompts: Arc<PromptSet>) -> Self {
        Self { model, prompts }
    }

    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    #[instrument(skip(self, raw), fields(model = %self.model.model(), query_len = raw.len()))]
    pub async fn classify(&self, raw: &str) -> Result<Query, ClassificationError> {
        let prompt = self
            .prompts
            .render(PromptKind::Classify, &[("user_query", raw)])?;

        let output = self
            .model
            .complete(ChatRequest::new(prompt, CLASSIFY_MAX_TOKENS))
            .await?;

        let classification: Classification = parse_or_repair(&output, |broken| async move {
            let prompt = self
                .prompts
                .render(PromptKind::ClassifyRepair, &[("broken_output", broken.as_str())])
                .map_err(|e| LlmError::InvalidRequest {
                    reason: e.to_string(),
                })?;
            self.model
                .complete(ChatRequest::new(prompt, CLASSIFY_MAX_TOKENS))
                .await
        })
        .await?;

        info!(
            category = %classification.category,
            language = %classification.language,
            "Query classified"
        );

        Ok(Query::new(raw, classification))
    }
}
