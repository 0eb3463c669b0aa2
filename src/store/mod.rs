//! Vector store abstraction for the retrieval pipeline.
//!
//! The [`VectorStore`] trait wraps one named collection of
//! `(id, vector, payload)` points with a fixed dimensionality and a
//! cosine distance metric. The primary implementation is
//! [`QdrantStore`](qdrant::QdrantStore) over Qdrant's REST API; the
//! [`InMemoryStore`](memory::InMemoryStore) backs the test suite.

pub mod memory;
pub mod qdrant;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PipelineError;

/// A point to be written to the collection.
#[derive(Debug, Clone)]
pub struct PointRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Value,
}

/// An ephemeral search result: point id, similarity score, and a
/// payload snapshot taken at query time.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub payload: Value,
}

/// Storage backend bound to a single vector collection.
///
/// Implementations must be `Send + Sync`; all operations are single
/// network round-trips with no retries.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Idempotent create-if-absent. A racing creation attempt that the
    /// store reports as "already exists" counts as success.
    async fn ensure_collection(&self, dims: usize) -> Result<(), PipelineError>;

    /// Write a batch of points. The batch succeeds or fails as a whole;
    /// there is no partial-point retry.
    async fn upsert(&self, points: Vec<PointRecord>) -> Result<(), PipelineError>;

    /// Similarity search: up to `k` points with score >= `min_score`,
    /// descending by score. Tie order is the store's native order and
    /// must not be relied upon.
    async fn search(
        &self,
        vector: &[f32],
        k: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredPoint>, PipelineError>;

    /// List up to `cap` points whose payload `field` equals `value`.
    ///
    /// This is not a similarity search: scores on the returned points
    /// are meaningless and must be discarded by callers.
    async fn list_by_filter(
        &self,
        field: &str,
        value: &str,
        cap: usize,
    ) -> Result<Vec<ScoredPoint>, PipelineError>;

    /// Merge fields into an existing point's payload, leaving its
    /// vector untouched.
    async fn set_payload(&self, id: &str, payload: Value) -> Result<(), PipelineError>;
}
