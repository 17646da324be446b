//! Embed → vector top-k → cross-encoder rerank → top-n.

mod chunk;
mod error;

#[cfg(test)]
mod tests;

pub use chunk::{Chunk, ChunkSource, ScoredChunk};
pub use error::RetrievalError;

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::constants::{DEFAULT_CANDIDATE_K, DEFAULT_RERANKED_N};
use crate::embedding::{PassageScorer, TextEmbedder};
use crate::vectordb::VectorDbClient;

pub struct RetrievalPipeline<V: VectorDbClient> {
    embedder: Arc<dyn TextEmbedder>,
    scorer: Arc<dyn PassageScorer>,
    vectordb: Arc<V>,
    collection: String,
    candidate_k: u64,
    top_n: usize,
}

impl<V: VectorDbClient> Clone for RetrievalPipeline<V> {
    fn clone(&self) -> Self {
        Self {
            embedder: Arc::clone(&self.embedder),
            scorer: Arc::clone(&self.scorer),
            vectordb: Arc::clone(&self.vectordb),
            collection: self.collection.clone(),
            candidate_k: self.candidate_k,
            top_n: self.top_n,
        }
    }
}

impl<V: VectorDbClient> RetrievalPipeline<V> {
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        scorer: Arc<dyn PassageScorer>,
        vectordb: Arc<V>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            scorer,
            vectordb,
            collection: collection.into(),
            candidate_k: DEFAULT_CANDIDATE_K,
            top_n: DEFAULT_RERANKED_N,
        }
    }

    pub fn with_limits(mut self, candidate_k: u64, top_n: usize) -> Self {
        self.candidate_k = candidate_k;
        self.top_n = top_n;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn vectordb(&self) -> &V {
        &self.vectordb
    }

    pub fn embedder(&self) -> &dyn TextEmbedder {
        self.embedder.as_ref()
    }

    pub fn scorer(&self) -> &dyn PassageScorer {
        self.scorer.as_ref()
    }

    /// At most `top_n` chunks, most relevant first. No matches is `Ok(vec![])`;
    /// any embedding, search or rerank failure returns no partial results.
    #[instrument(skip(self, query), fields(collection = %self.collection, query_len = query.len()))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredChunk>, RetrievalError> {
        let embedder = Arc::clone(&self.embedder);
        let text = query.to_string();
        let vector = tokio::task::spawn_blocking(move || embedder.embed_query(&text)).await??;

        let expected = self.embedder.dimension();
        if vector.len() != expected {
            return Err(RetrievalError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }

        let hits = self
            .vectordb
            .search(&self.collection, vector, self.candidate_k)
            .await?;
        let total_hits = hits.len();

        let candidates: Vec<(Chunk, f32)> = hits
            .into_iter()
            .filter_map(|hit| {
                let id = hit.id.clone();
                let chunk = Chunk::from_search_result(hit);
                if chunk.is_none() {
                    warn!(point_id = %id, "Search hit has no passage text, skipping");
                }
                chunk
            })
            .collect();

        if candidates.is_empty() {
            info!(hits = total_hits, "No usable chunks retrieved");
            return Ok(Vec::new());
        }

        let scorer = Arc::clone(&self.scorer);
        let query_text = query.to_string();
        let passages: Vec<String> = candidates.iter().map(|(c, _)| c.text.clone()).collect();
        let rerank_scores = tokio::task::spawn_blocking(move || {
            passages
                .iter()
                .map(|p| scorer.score(&query_text, p))
                .collect::<Result<Vec<f32>, _>>()
        })
        .await??;

        let ranked = rank_top_n(
            candidates
                .into_iter()
                .zip(rerank_scores)
                .map(|((chunk, similarity), rerank)| (chunk, similarity, rerank))
                .collect(),
            self.top_n,
        );

        debug!(
            hits = total_hits,
            kept = ranked.len(),
            top_similarity = ranked.first().map(|c| c.similarity),
            top_rerank = ranked.first().map(|c| c.rerank_score),
            "Retrieval complete"
        );

        Ok(ranked)
    }
}

/// Sorts by rerank score (desc) and keeps `n`, assigning ranks from 1.
///
/// Ties break on chunk id so the kept set depends only on scores and ids,
/// never on input order. NaN scores rank last.
pub fn rank_top_n(mut candidates: Vec<(Chunk, f32, f32)>, n: usize) -> Vec<ScoredChunk> {
    let key = |score: f32| if score.is_nan() { f32::NEG_INFINITY } else { score };
    candidates.sort_by(|(a, _, a_score), (b, _, b_score)| {
        key(*b_score)
            .total_cmp(&key(*a_score))
            .then_with(|| a.id.cmp(&b.id))
    });

    candidates
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, (chunk, similarity, rerank_score))| ScoredChunk {
            chunk,
            similarity,
            rerank_score,
            rank: i + 1,
        })
        .collect()
}
