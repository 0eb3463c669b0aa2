//! In-memory [`VectorStore`] implementation for the test suite.
//!
//! Holds points behind a `std::sync::RwLock`; similarity search is
//! brute-force cosine over all stored vectors. Mirrors the store
//! contract closely enough to exercise the pipelines without a running
//! Qdrant instance.

use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PipelineError;

use super::{PointRecord, ScoredPoint, VectorStore};

struct Inner {
    dims: Option<usize>,
    points: Vec<PointRecord>,
}

/// In-memory store for tests.
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                dims: None,
                points: Vec::new(),
            }),
        }
    }

    /// Number of stored points (test helper).
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a payload snapshot by point id (test helper).
    pub fn payload(&self, id: &str) -> Option<Value> {
        self.inner
            .read()
            .unwrap()
            .points
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.payload.clone())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn ensure_collection(&self, dims: usize) -> Result<(), PipelineError> {
        let mut inner = self.inner.write().unwrap();
        match inner.dims {
            None => {
                inner.dims = Some(dims);
                Ok(())
            }
            // Repeat creation with matching parameters is a no-op.
            Some(existing) if existing == dims => Ok(()),
            Some(existing) => Err(PipelineError::StoreWrite(format!(
                "collection exists with dimensionality {} (requested {})",
                existing, dims
            ))),
        }
    }

    async fn upsert(&self, points: Vec<PointRecord>) -> Result<(), PipelineError> {
        let mut inner = self.inner.write().unwrap();
        let dims = inner
            .dims
            .ok_or_else(|| PipelineError::StoreWrite("collection does not exist".to_string()))?;

        // The whole batch is rejected on any dimensionality mismatch,
        // matching the store's all-or-nothing write semantics.
        for point in &points {
            if point.vector.len() != dims {
                return Err(PipelineError::StoreWrite(format!(
                    "vector dimensionality {} does not match collection ({})",
                    point.vector.len(),
                    dims
                )));
            }
        }

        for point in points {
            inner.points.retain(|p| p.id != point.id);
            inner.points.push(point);
        }
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        k: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredPoint>, PipelineError> {
        let inner = self.inner.read().unwrap();
        let mut hits: Vec<ScoredPoint> = inner
            .points
            .iter()
            .map(|p| ScoredPoint {
                id: p.id.clone(),
                score: cosine_sim(vector, &p.vector),
                payload: p.payload.clone(),
            })
            .filter(|hit| hit.score >= min_score)
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }

    async fn list_by_filter(
        &self,
        field: &str,
        value: &str,
        cap: usize,
    ) -> Result<Vec<ScoredPoint>, PipelineError> {
        let inner = self.inner.read().unwrap();
        let mut hits: Vec<ScoredPoint> = inner
            .points
            .iter()
            .filter(|p| p.payload.get(field).and_then(|v| v.as_str()) == Some(value))
            .map(|p| ScoredPoint {
                id: p.id.clone(),
                score: 0.0,
                payload: p.payload.clone(),
            })
            .collect();
        hits.truncate(cap);
        Ok(hits)
    }

    async fn set_payload(&self, id: &str, payload: Value) -> Result<(), PipelineError> {
        let mut inner = self.inner.write().unwrap();
        let point = inner
            .points
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PipelineError::StoreWrite(format!("point not found: {}", id)))?;

        let (Some(target), Some(fields)) = (point.payload.as_object_mut(), payload.as_object())
        else {
            return Err(PipelineError::StoreWrite(
                "payload must be a JSON object".to_string(),
            ));
        };
        for (key, val) in fields {
            target.insert(key.clone(), val.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(id: &str, vector: Vec<f32>, payload: Value) -> PointRecord {
        PointRecord {
            id: id.to_string(),
            vector,
            payload,
        }
    }

    #[tokio::test]
    async fn ensure_collection_is_idempotent() {
        let store = InMemoryStore::new();
        store.ensure_collection(3).await.unwrap();
        store.ensure_collection(3).await.unwrap();
        assert!(store.ensure_collection(4).await.is_err());
    }

    #[tokio::test]
    async fn upsert_rejects_dimension_mismatch() {
        let store = InMemoryStore::new();
        store.ensure_collection(3).await.unwrap();
        let err = store
            .upsert(vec![point("a", vec![1.0, 0.0], json!({}))])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::StoreWrite(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn search_orders_by_score_and_applies_threshold() {
        let store = InMemoryStore::new();
        store.ensure_collection(2).await.unwrap();
        store
            .upsert(vec![
                point("close", vec![1.0, 0.0], json!({"k": "a"})),
                point("mid", vec![0.7, 0.7], json!({"k": "b"})),
                point("far", vec![0.0, 1.0], json!({"k": "c"})),
            ])
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.0], 10, 0.5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "close");
        assert_eq!(hits[1].id, "mid");
    }

    #[tokio::test]
    async fn perfect_threshold_with_no_identical_vector_returns_empty() {
        let store = InMemoryStore::new();
        store.ensure_collection(2).await.unwrap();
        store
            .upsert(vec![point("a", vec![0.9, 0.1], json!({}))])
            .await
            .unwrap();
        let hits = store.search(&[1.0, 0.0], 10, 1.0).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn list_by_filter_matches_and_caps() {
        let store = InMemoryStore::new();
        store.ensure_collection(2).await.unwrap();
        let mut points = Vec::new();
        for i in 0..5 {
            points.push(point(
                &format!("p{}", i),
                vec![0.0, 1.0],
                json!({"source_doc_id": "doc-a"}),
            ));
        }
        points.push(point("other", vec![1.0, 0.0], json!({"source_doc_id": "doc-b"})));
        store.upsert(points).await.unwrap();

        let hits = store.list_by_filter("source_doc_id", "doc-a", 3).await.unwrap();
        assert_eq!(hits.len(), 3);
        let all = store.list_by_filter("source_doc_id", "doc-a", 100).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn set_payload_merges_without_clobbering() {
        let store = InMemoryStore::new();
        store.ensure_collection(2).await.unwrap();
        store
            .upsert(vec![point(
                "a",
                vec![1.0, 0.0],
                json!({"usage_count": 0, "text": "body"}),
            )])
            .await
            .unwrap();

        store
            .set_payload("a", json!({"usage_count": 1}))
            .await
            .unwrap();

        let payload = store.payload("a").unwrap();
        assert_eq!(payload["usage_count"], 1);
        assert_eq!(payload["text"], "body");
    }
}
