use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::error::CompositionError;
use super::fallback::WebSearchFallback;
use super::{Answer, AnswerSource, ModelAnswer};
use crate::constants::DEFAULT_RELEVANCE_THRESHOLD;
use crate::llm::{ANSWER_MAX_TOKENS, ChatModel, ChatRequest, LlmError, parse_or_repair};
use crate::prompts::{PromptKind, PromptSet};
use crate::query::Query;
use crate::retrieval::ScoredChunk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Context,
    WebSearch,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::Context => "context",
            Route::WebSearch => "web_search",
        }
    }
}

/// Web search when there are no chunks or the top chunk's vector similarity
/// is below `threshold`.
pub fn route(chunks: &[ScoredChunk], threshold: f32) -> Route {
    match chunks.first() {
        Some(top) if top.similarity >= threshold => Route::Context,
        _ => Route::WebSearch,
    }
}

/// Numbered passages with their citations, in rank order.
pub fn format_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|c| {
            let citation = c
                .chunk
                .source
                .citation()
                .unwrap_or_else(|| "Unknown source".to_string());
            format!("[{}] {}\n{}", c.rank, citation, c.chunk.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Clone)]
pub struct AnswerComposer {
    model: Arc<dyn ChatModel>,
    fallback: WebSearchFallback,
    prompts: Arc<PromptSet>,
    threshold: f32,
}

impl AnswerComposer {
    pub fn new(
        model: Arc<dyn ChatModel>,
        fallback: WebSearchFallback,
        prompts: Arc<PromptSet>,
    ) -> Self {
        Self {
            model,
            fallback,
            prompts,
            threshold: DEFAULT_RELEVANCE_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn fallback(&self) -> &WebSearchFallback {
        &self.fallback
    }

    #[instrument(skip_all, fields(chunks = chunks.len(), route = tracing::field::Empty))]
    pub async fn compose(
        &self,
        query: &Query,
        chunks: &[ScoredChunk],
    ) -> Result<Answer, CompositionError> {
        let route = route(chunks, self.threshold);
        tracing::Span::current().record("route", route.as_str());

        if route == Route::WebSearch {
            info!(
                top_score = chunks.first().map(|c| c.similarity),
                threshold = self.threshold,
                "No chunk cleared the relevance threshold"
            );
            return Ok(self.fallback.answer(query).await?);
        }

        let context = format_context(chunks);
        let prompt = self.prompts.render(
            PromptKind::Answer,
            &[
                ("user_query", query.raw()),
                ("translated_query", query.search_text()),
                ("language", query.language().prompt_name()),
                ("context", context.as_str()),
            ],
        )?;

        let output = self
            .model
            .complete(ChatRequest::new(prompt, ANSWER_MAX_TOKENS))
            .await?;

        let parsed: Result<ModelAnswer, _> = parse_or_repair(&output, |broken| async move {
            let prompt = self
                .prompts
                .render(PromptKind::AnswerRepair, &[("broken_output", broken.as_str())])
                .map_err(|e| LlmError::InvalidRequest {
                    reason: e.to_string(),
                })?;
            self.model
                .complete(ChatRequest::new(prompt, ANSWER_MAX_TOKENS))
                .await
        })
        .await;

        let answer = match parsed {
            Ok(output) => Answer::from_model(output, AnswerSource::Context, false),
            Err(err) => {
                warn!(error = %err, "Answer could not be structured, returning raw text");
                return Ok(Answer::degraded(err.raw()));
            }
        };

        if answer.is_empty() {
            info!("Context insufficient according to the answer model, falling back");
            return Ok(self.fallback.answer(query).await?);
        }

        info!(references = answer.reference.len(), "Answered from context");
        Ok(answer)
    }
}
