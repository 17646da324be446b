use super::*;
use std::collections::BTreeMap;

use crate::embedding::{EmbeddingError, MockPassageScorer, QueryEncoder};
use crate::vectordb::{MockVectorDbClient, SearchResult, VectorPoint};

const COLLECTION: &str = "nepal_law";
const DIM: usize = 384;

fn passage(id: u64) -> String {
    format!("Passage {} about the Muluki Civil Code.", id)
}

async fn seeded_db(n: u64) -> Arc<MockVectorDbClient> {
    let db = MockVectorDbClient::new();
    db.ensure_collection(COLLECTION, DIM as u64).await.unwrap();
    let points = (1..=n)
        .map(|id| {
            VectorPoint::new(id, vec![0.1; DIM])
                .with_field("text", passage(id))
                .with_field("document", "Muluki Civil Code, 2074")
                .with_field("part", id.to_string())
        })
        .collect();
    db.upsert_points(COLLECTION, points).await.unwrap();
    Arc::new(db)
}

fn pipeline(
    db: Arc<MockVectorDbClient>,
    scorer: Arc<MockPassageScorer>,
) -> RetrievalPipeline<MockVectorDbClient> {
    let encoder = Arc::new(QueryEncoder::stub().unwrap());
    RetrievalPipeline::new(encoder, scorer, db, COLLECTION)
}

fn chunk(id: &str) -> Chunk {
    Chunk {
        id: id.to_string(),
        text: format!("text {}", id),
        source: ChunkSource::default(),
        metadata: BTreeMap::new(),
    }
}

struct FailingEmbedder;

impl TextEmbedder for FailingEmbedder {
    fn embed_query(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::InferenceFailed {
            reason: "out of memory".to_string(),
        })
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

struct ShortEmbedder;

impl TextEmbedder for ShortEmbedder {
    fn embed_query(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(vec![1.0; 3])
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

mod pipeline_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_returns_empty() {
        let db = seeded_db(0).await;
        let scorer = Arc::new(MockPassageScorer::new());
        let result = pipeline(db, scorer.clone()).retrieve("marriage age").await.unwrap();

        assert!(result.is_empty());
        assert_eq!(scorer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_searches_ten_and_keeps_five_ranked() {
        let db = seeded_db(12).await;
        let scorer = Arc::new(MockPassageScorer::with_default_score(0.0));
        for id in 1..=12u64 {
            db.set_fixed_score(id, 0.5 + id as f32 * 0.01);
            scorer.set_score(passage(id), id as f32);
        }

        let result = pipeline(db, scorer.clone()).retrieve("q").await.unwrap();

        // Only the 10 vector candidates (ids 3..=12) are reranked.
        assert_eq!(scorer.call_count(), 10);
        assert_eq!(result.len(), 5);

        let ids: Vec<&str> = result.iter().map(|c| c.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["12", "11", "10", "9", "8"]);
        let ranks: Vec<usize> = result.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert!((result[0].similarity - 0.62).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_rerank_overrides_vector_order() {
        let db = seeded_db(6).await;
        db.set_fixed_score(1, 0.95);
        db.set_fixed_score(6, 0.71);
        let scorer = Arc::new(MockPassageScorer::with_default_score(0.1));
        scorer.set_score(passage(6), 0.99);
        scorer.set_score(passage(1), 0.20);

        let result = pipeline(db, scorer).retrieve("q").await.unwrap();

        assert_eq!(result[0].chunk.id, "6");
        assert!((result[0].similarity - 0.71).abs() < 1e-6);
        assert_eq!(result[1].chunk.id, "1");
    }

    #[tokio::test]
    async fn test_chunk_source_from_payload() {
        let db = seeded_db(1).await;
        let scorer = Arc::new(MockPassageScorer::new());
        let result = pipeline(db, scorer).retrieve("q").await.unwrap();

        let source = &result[0].chunk.source;
        assert_eq!(source.document.as_deref(), Some("Muluki Civil Code, 2074"));
        assert_eq!(source.part.as_deref(), Some("1"));
        assert_eq!(source.article, None);
        assert_eq!(
            source.citation().as_deref(),
            Some("Muluki Civil Code, 2074, Part 1")
        );
    }

    #[tokio::test]
    async fn test_hits_without_text_are_skipped() {
        let db = seeded_db(2).await;
        db.upsert_points(
            COLLECTION,
            vec![VectorPoint::new(3, vec![0.1; DIM]).with_field("document", "orphan")],
        )
        .await
        .unwrap();

        let scorer = Arc::new(MockPassageScorer::new());
        let result = pipeline(db, scorer).retrieve("q").await.unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|c| c.chunk.id != "3"));
    }

    #[tokio::test]
    async fn test_vector_store_failure() {
        let db = seeded_db(3).await;
        db.set_fail(true);
        let scorer = Arc::new(MockPassageScorer::new());

        let err = pipeline(db, scorer).retrieve("q").await.unwrap_err();
        assert!(matches!(err, RetrievalError::VectorStore(_)));
    }

    #[tokio::test]
    async fn test_embedding_failure() {
        let db = seeded_db(3).await;
        let pipeline = RetrievalPipeline::new(
            Arc::new(FailingEmbedder),
            Arc::new(MockPassageScorer::new()),
            db.clone(),
            COLLECTION,
        );

        let err = pipeline.retrieve("q").await.unwrap_err();
        assert!(matches!(err, RetrievalError::Embedding(_)));
        assert_eq!(db.search_count(), 0);
    }

    #[tokio::test]
    async fn test_embedding_dimension_checked() {
        let db = seeded_db(3).await;
        let pipeline = RetrievalPipeline::new(
            Arc::new(ShortEmbedder),
            Arc::new(MockPassageScorer::new()),
            db,
            COLLECTION,
        );

        assert!(matches!(
            pipeline.retrieve("q").await,
            Err(RetrievalError::DimensionMismatch {
                expected: 384,
                actual: 3
            })
        ));
    }

    #[tokio::test]
    async fn test_rerank_failure_returns_no_partial_results() {
        let db = seeded_db(3).await;
        let scorer = Arc::new(MockPassageScorer::new());
        scorer.set_fail(true);

        let err = pipeline(db, scorer).retrieve("q").await.unwrap_err();
        assert!(matches!(err, RetrievalError::Rerank(_)));
    }

    #[tokio::test]
    async fn test_custom_limits() {
        let db = seeded_db(8).await;
        let scorer = Arc::new(MockPassageScorer::new());
        let result = pipeline(db, scorer.clone())
            .with_limits(4, 2)
            .retrieve("q")
            .await
            .unwrap();

        assert_eq!(scorer.call_count(), 4);
        assert_eq!(result.len(), 2);
    }
}

mod ranking_tests {
    use super::*;

    #[test]
    fn test_rank_top_n_fewer_than_n() {
        let ranked = rank_top_n(vec![(chunk("a"), 0.9, 0.1), (chunk("b"), 0.8, 0.7)], 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].chunk.id, "b");
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn test_ties_independent_of_input_order() {
        // Seven candidates, four tied at the cut-off score.
        let base: Vec<(Chunk, f32, f32)> = vec![
            (chunk("a"), 0.9, 0.8),
            (chunk("b"), 0.9, 0.5),
            (chunk("c"), 0.9, 0.5),
            (chunk("d"), 0.9, 0.9),
            (chunk("e"), 0.9, 0.5),
            (chunk("f"), 0.9, 0.5),
            (chunk("g"), 0.9, 0.1),
        ];

        let expected: Vec<String> = rank_top_n(base.clone(), 5)
            .into_iter()
            .map(|c| c.chunk.id)
            .collect();

        for shift in 1..base.len() {
            let mut rotated = base.clone();
            rotated.rotate_left(shift);
            rotated.reverse();
            let ids: Vec<String> = rank_top_n(rotated, 5)
                .into_iter()
                .map(|c| c.chunk.id)
                .collect();
            assert_eq!(ids, expected, "shift {shift}");
        }

        assert_eq!(expected, vec!["d", "a", "b", "c", "e"]);
    }

    #[test]
    fn test_nan_scores_sort_last() {
        let ranked = rank_top_n(
            vec![(chunk("nan"), 0.9, f32::NAN), (chunk("ok"), 0.9, 0.0)],
            1,
        );
        assert_eq!(ranked[0].chunk.id, "ok");
    }
}

mod chunk_tests {
    use super::*;

    fn hit(payload: &[(&str, &str)]) -> SearchResult {
        SearchResult {
            id: "42".to_string(),
            score: 0.8,
            payload: payload
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_alias_keys_and_leftover_metadata() {
        let (chunk, score) = Chunk::from_search_result(hit(&[
            ("text", "  Every person shall have the right to live with dignity.  "),
            ("source", "Constitution of Nepal"),
            ("chapter", "Part 3"),
            ("section", "16"),
            ("page", "12"),
        ]))
        .unwrap();

        assert_eq!(score, 0.8);
        assert_eq!(
            chunk.text,
            "Every person shall have the right to live with dignity."
        );
        assert_eq!(
            chunk.source.citation().as_deref(),
            Some("Constitution of Nepal, Part 3, Article 16")
        );
        assert_eq!(chunk.metadata.len(), 1);
        assert_eq!(chunk.metadata["page"], "12");
    }

    #[test]
    fn test_primary_key_wins_over_alias() {
        let (chunk, _) = Chunk::from_search_result(hit(&[
            ("text", "t"),
            ("document", "Labour Act, 2074"),
            ("source", "scraped.pdf"),
        ]))
        .unwrap();
        assert_eq!(chunk.source.document.as_deref(), Some("Labour Act, 2074"));
        assert!(!chunk.metadata.contains_key("source"));
    }

    #[test]
    fn test_blank_text_rejected() {
        assert!(Chunk::from_search_result(hit(&[("text", "   ")])).is_none());
        assert!(Chunk::from_search_result(hit(&[("document", "x")])).is_none());
    }

    #[test]
    fn test_citation_empty_source() {
        assert_eq!(ChunkSource::default().citation(), None);
    }
}
