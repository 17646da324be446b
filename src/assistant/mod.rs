//! Request orchestration: classify, then (for legal queries) retrieve and compose.

mod error;


pub use error::AssistantError;

use tracing::{info, instrument, warn};

use crate::answer::{Answer, AnswerComposer};
use crate::classifier::Classifier;
use crate::config::RetrievalFailurePolicy;
use crate::query::{Category, Query, safety_message};
use crate::retrieval::RetrievalPipeline;
use crate::vectordb::VectorDbClient;

/// The classified query alongside the answer sent back.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub query: Query,
    pub answer: Answer,
}

pub struct Assistant<V: VectorDbClient> {
    classifier: Classifier,
    retrieval: RetrievalPipeline<V>,
    composer: AnswerComposer,
    retrieval_failure: RetrievalFailurePolicy,
}

impl<V: VectorDbClient> Assistant<V> {
    pub fn new(
        classifier: Classifier,
        retrieval: RetrievalPipeline<V>,
        composer: AnswerComposer,
    ) -> Self {
        Self {
            classifier,
            retrieval,
            composer,
            retrieval_failure: RetrievalFailurePolicy::default(),
        }
    }

    pub fn with_retrieval_failure(mut self, policy: RetrievalFailurePolicy) -> Self {
        self.retrieval_failure = policy;
        self
    }

    pub fn retrieval(&self) -> &RetrievalPipeline<V> {
        &self.retrieval
    }

    pub fn composer(&self) -> &AnswerComposer {
        &self.composer
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    #[instrument(skip(self, raw), fields(query_len = raw.len()))]
    pub async fn answer(&self, raw: &str) -> Result<QueryOutcome, AssistantError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AssistantError::EmptyQuery);
        }

        let query = self.classifier.classify(raw).await?;

        let answer = match query.category() {
            Category::GeneralChat | Category::Unsupported => {
                Answer::conversation(query.category(), query.response().trim())
            }
            Category::HarmfulIntent => {
                warn!(language = %query.language(), "Harmful intent detected, sending safety message");
                Answer::conversation(
                    Category::HarmfulIntent,
                    safety_message(query.language()),
                )
            }
            Category::LegalQuery => {
                let chunks = match self.retrieval.retrieve(query.search_text()).await {
                    Ok(chunks) => chunks,
                    Err(err) => match self.retrieval_failure {
                        RetrievalFailurePolicy::Fallback => {
                            warn!(error = %err, "Retrieval failed, treating as no relevant context");
                            Vec::new()
                        }
                        RetrievalFailurePolicy::Abort => return Err(err.into()),
                    },
                };
                self.composer.compose(&query, &chunks).await?
            }
        };

        info!(
            category = %query.category(),
            source = answer.source.as_str(),
            fallback = answer.fallback,
            "Query answered"
        );

        Ok(QueryOutcome { query, answer })
    }
}
