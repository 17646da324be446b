use std::sync::Arc;
use tracing::{info, instrument};

use super::error::FallbackError;
use super::{Answer, AnswerSource, ModelAnswer};
use crate::llm::{LlmError, WebSearchModel, parse_or_repair};
use crate::prompts::{PromptKind, PromptSet};
use crate::query::Query;

/// Asks a search-grounded model, restricted to trusted domains.
#[derive(Clone)]
pub struct WebSearchFallback {
    model: Arc<dyn WebSearchModel>,
    prompts: Arc<PromptSet>,
    trusted_domains: String,
}

impl WebSearchFallback {
    pub fn new(
        model: Arc<dyn WebSearchModel>,
        prompts: Arc<PromptSet>,
        trusted_domains: &[String],
    ) -> Self {
        Self {
            model,
            prompts,
            trusted_domains: trusted_domains.join(", "),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    /// Always tagged `fallback: true`. An empty message means nothing
    /// trustworthy was found.
    #[instrument(skip(self, query), fields(model = %self.model.model()))]
    pub async fn answer(&self, query: &Query) -> Result<Answer, FallbackError> {
        let prompt = self.prompts.render(
            PromptKind::WebSearch,
            &[
                ("user_query", query.raw()),
                ("translated_query", query.search_text()),
                ("language", query.language().prompt_name()),
                ("trusted_domains", self.trusted_domains.as_str()),
            ],
        )?;

        let raw = self.model.search(&prompt).await?;

        let output: ModelAnswer = parse_or_repair(&raw, |broken| async move {
            let prompt = self
                .prompts
                .render(PromptKind::AnswerRepair, &[("broken_output", broken.as_str())])
                .map_err(|e| LlmError::InvalidRequest {
                    reason: e.to_string(),
                })?;
            self.model.search(&prompt).await
        })
        .await?;
        let answer = Answer::from_model(output, AnswerSource::WebSearch, true);

        info!(
            found = !answer.is_empty(),
            references = answer.reference.len(),
            "Web search fallback answered"
        );

        Ok(answer)
    }
}
