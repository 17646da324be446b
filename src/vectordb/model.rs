use std::collections::BTreeMap;

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{ScoredPoint, Value};

/// A passage vector plus its metadata, ready for upsert.
#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    /// Flat string metadata (`text`, `document`, `part`, `article`, ...).
    pub payload: BTreeMap<String, String>,
}

impl VectorPoint {
    pub fn new(id: u64, vector: Vec<f32>) -> Self {
        Self {
            id,
            vector,
            payload: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// One nearest-neighbour hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Point id rendered as a string (numeric or UUID ids).
    pub id: String,
    /// Cosine similarity reported by the store.
    pub score: f32,
    pub payload: BTreeMap<String, String>,
}

impl SearchResult {
    pub fn from_scored_point(point: ScoredPoint) -> Option<Self> {
        let id = match point.id.and_then(|pid| pid.point_id_options) {
            Some(PointIdOptions::Num(n)) => n.to_string(),
            Some(PointIdOptions::Uuid(u)) => u,
            None => return None,
        };

        let payload = point
            .payload
            .into_iter()
            .filter_map(|(key, value)| payload_value_to_string(&value).map(|v| (key, v)))
            .collect();

        Some(SearchResult {
            id,
            score: point.score,
            payload,
        })
    }
}

/// Scalars become strings; lists, structs and nulls are dropped.
fn payload_value_to_string(value: &Value) -> Option<String> {
    if let Some(s) = value.as_str() {
        return Some(s.to_string());
    }
    if let Some(i) = value.as_integer() {
        return Some(i.to_string());
    }
    if let Some(d) = value.as_double() {
        return Some(d.to_string());
    }
    value.as_bool().map(|b| b.to_string())
}
