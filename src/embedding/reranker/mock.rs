use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::RerankerError;
use crate::embedding::PassageScorer;

/// Scores passages from a lookup table; unknown passages get `default_score`.
#[derive(Debug, Default)]
pub struct MockPassageScorer {
    scores: Mutex<HashMap<String, f32>>,
    default_score: f32,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockPassageScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_score(default_score: f32) -> Self {
        Self {
            default_score,
            ..Self::default()
        }
    }

    pub fn set_score(&self, passage: impl Into<String>, score: f32) {
        if let Ok(mut scores) = self.scores.lock() {
            scores.insert(passage.into(), score);
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PassageScorer for MockPassageScorer {
    fn score(&self, _query: &str, passage: &str) -> Result<f32, RerankerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(RerankerError::InferenceFailed {
                reason: "mock failure".to_string(),
            });
        }

        let scores = self
            .scores
            .lock()
            .map_err(|e| RerankerError::InferenceFailed {
                reason: e.to_string(),
            })?;

        Ok(scores.get(passage).copied().unwrap_or(self.default_score))
    }

    fn is_stub(&self) -> bool {
        true
    }
}
