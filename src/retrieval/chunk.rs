use serde::Serialize;
use std::collections::BTreeMap;

use crate::vectordb::{SearchResult, TEXT_PAYLOAD_KEY};

const DOCUMENT_KEYS: [&str; 2] = ["document", "source"];
const PART_KEYS: [&str; 2] = ["part", "chapter"];
const ARTICLE_KEYS: [&str; 2] = ["article", "section"];

/// Where a chunk sits in the legal corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChunkSource {
    pub document: Option<String>,
    pub part: Option<String>,
    pub article: Option<String>,
}

impl ChunkSource {
    /// `Constitution of Nepal, Part 3, Article 17`; missing pieces are skipped.
    pub fn citation(&self) -> Option<String> {
        let parts: Vec<String> = [
            self.document.clone(),
            self.part.as_ref().map(|p| label("Part", p)),
            self.article.as_ref().map(|a| label("Article", a)),
        ]
        .into_iter()
        .flatten()
        .collect();

        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// Prefixes bare numbers (`"3"` → `"Part 3"`); labelled values pass through.
fn label(prefix: &str, value: &str) -> String {
    if value.chars().all(|c| c.is_ascii_digit()) {
        format!("{} {}", prefix, value)
    } else {
        value.to_string()
    }
}

/// One unit of indexed legal text. Read-only to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub source: ChunkSource,
    /// Payload keys not consumed above.
    pub metadata: BTreeMap<String, String>,
}

fn take_first(payload: &mut BTreeMap<String, String>, keys: &[&str]) -> Option<String> {
    let mut found = None;
    for key in keys {
        if let Some(value) = payload.remove(*key) {
            let value = value.trim().to_string();
            if found.is_none() && !value.is_empty() {
                found = Some(value);
            }
        }
    }
    found
}

impl Chunk {
    /// Builds a chunk from a search hit; hits without passage text yield `None`.
    pub fn from_search_result(result: SearchResult) -> Option<(Self, f32)> {
        let SearchResult {
            id,
            score,
            mut payload,
        } = result;

        let text = payload.remove(TEXT_PAYLOAD_KEY)?.trim().to_string();
        if text.is_empty() {
            return None;
        }

        let source = ChunkSource {
            document: take_first(&mut payload, &DOCUMENT_KEYS),
            part: take_first(&mut payload, &PART_KEYS),
            article: take_first(&mut payload, &ARTICLE_KEYS),
        };

        Some((
            Self {
                id,
                text,
                source,
                metadata: payload,
            },
            score,
        ))
    }
}

/// A chunk with its vector similarity and, after reranking, its 1-based rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub similarity: f32,
    pub rerank_score: f32,
    pub rank: usize,
}
