use crate::vectordb::{SearchResult, VectorDbClient, VectorDbError, VectorPoint};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory stand-in for Qdrant with brute-force cosine search.
///
/// `set_fixed_score` pins the similarity reported for a point so routing
/// tests can place the top hit exactly above or below a threshold.
#[derive(Default)]
pub struct MockVectorDbClient {
    collections: RwLock<HashMap<String, MockCollection>>,
    fixed_scores: RwLock<HashMap<u64, f32>>,
    fail: AtomicBool,
    searches: AtomicUsize,
}

#[derive(Default, Clone)]
struct MockCollection {
    vector_size: u64,
    points: HashMap<u64, MockStoredPoint>,
}

#[derive(Clone)]
struct MockStoredPoint {
    vector: Vec<f32>,
    payload: BTreeMap<String, String>,
}

impl MockVectorDbClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point_count(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .ok()?
            .get(collection)
            .map(|c| c.points.len())
    }

    pub fn set_fixed_score(&self, id: u64, score: f32) {
        if let Ok(mut scores) = self.fixed_scores.write() {
            scores.insert(id, score);
        }
    }

    /// Makes every subsequent call fail with a connection error.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn check_fail(&self) -> Result<(), VectorDbError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(VectorDbError::ConnectionFailed {
                url: "mock://".to_string(),
                message: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}

impl VectorDbClient for MockVectorDbClient {
    async fn health_check(&self) -> Result<(), VectorDbError> {
        self.check_fail()
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, VectorDbError> {
        self.check_fail()?;
        let collections =
            self.collections
                .read()
                .map_err(|_| VectorDbError::ConnectionFailed {
                    url: "mock://".to_string(),
                    message: "lock poisoned".to_string(),
                })?;
        Ok(collections.contains_key(name))
    }

    async fn ensure_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        self.check_fail()?;
        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::CreateCollectionFailed {
                    collection: name.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        collections
            .entry(name.to_string())
            .or_insert(MockCollection {
                vector_size,
                points: HashMap::new(),
            });

        Ok(())
    }

    async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> Result<(), VectorDbError> {
        self.check_fail()?;
        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::UpsertFailed {
                    collection: collection.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        for point in points {
            if point.vector.len() as u64 != coll.vector_size {
                return Err(VectorDbError::InvalidDimension {
                    expected: coll.vector_size as usize,
                    actual: point.vector.len(),
                });
            }

            coll.points.insert(
                point.id,
                MockStoredPoint {
                    vector: point.vector,
                    payload: point.payload,
                },
            );
        }

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<SearchResult>, VectorDbError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.check_fail()?;

        let collections = self
            .collections
            .read()
            .map_err(|_| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: "lock poisoned".to_string(),
            })?;
        let fixed = self
            .fixed_scores
            .read()
            .map_err(|_| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: "lock poisoned".to_string(),
            })?;

        let coll =
            collections
                .get(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        if query.len() as u64 != coll.vector_size {
            return Err(VectorDbError::InvalidDimension {
                expected: coll.vector_size as usize,
                actual: query.len(),
            });
        }

        let mut results: Vec<(u64, SearchResult)> = coll
            .points
            .iter()
            .map(|(&id, p)| {
                let score = fixed
                    .get(&id)
                    .copied()
                    .unwrap_or_else(|| cosine_similarity(&query, &p.vector));
                (
                    id,
                    SearchResult {
                        id: id.to_string(),
                        score,
                        payload: p.payload.clone(),
                    },
                )
            })
            .collect();

        results.sort_by(|(a_id, a), (b_id, b)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a_id.cmp(b_id))
        });

        results.truncate(limit as usize);
        Ok(results.into_iter().map(|(_, r)| r).collect())
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
