//! Retrieval pipeline: query embedding, similarity search, best-effort
//! usage accounting, and result shaping.

use std::sync::Arc;

use serde_json::json;

use crate::embedding::Embedder;
use crate::error::PipelineError;
use crate::models::{preview, ChunkPayload, SearchHit};
use crate::store::{ScoredPoint, VectorStore};

pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Run a similarity search for `query` and shape the hits.
    ///
    /// Zero hits is a valid outcome and returns an empty vector, never
    /// an error. Each returned hit carries the payload snapshot taken
    /// at search time; the usage-count increment happens afterwards and
    /// is never reflected in the response.
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        min_score: f32,
    ) -> Result<Vec<SearchHit>, PipelineError> {
        let query_vector = self.embed_query(query).await?;
        let hits = self.store.search(&query_vector, k, min_score).await?;
        tracing::debug!(query, hits = hits.len(), "similarity search");

        let shaped = hits
            .iter()
            .filter_map(|hit| shape_hit(hit))
            .collect::<Vec<_>>();

        // Usage counting is best-effort telemetry: a failed increment
        // is logged and the hit is still returned with its prior
        // payload. Identical concurrent queries may lose updates; that
        // is accepted.
        for hit in &hits {
            self.bump_usage_count(hit).await;
        }

        Ok(shaped)
    }

    /// List all chunks of one document, up to `cap`.
    ///
    /// Documents with more chunks than the cap are silently truncated.
    /// Goes through the store's filter-only listing, so no query
    /// embedding is involved and scores are discarded.
    pub async fn document_chunks(
        &self,
        source_doc_id: &str,
        cap: usize,
    ) -> Result<Vec<ChunkPayload>, PipelineError> {
        let hits = self
            .store
            .list_by_filter("source_doc_id", source_doc_id, cap)
            .await?;

        Ok(hits
            .iter()
            .filter_map(|hit| serde_json::from_value(hit.payload.clone()).ok())
            .collect())
    }

    /// Embed a query as a single-item batch.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, PipelineError> {
        let mut vectors = self.embedder.embed(&[query.to_string()]).await?;
        if vectors.len() != 1 {
            return Err(PipelineError::EmbeddingService(format!(
                "expected 1 query vector, got {}",
                vectors.len()
            )));
        }
        Ok(vectors.remove(0))
    }

    async fn bump_usage_count(&self, hit: &ScoredPoint) {
        let current = hit
            .payload
            .get("usage_count")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        if let Err(e) = self
            .store
            .set_payload(&hit.id, json!({ "usage_count": current + 1 }))
            .await
        {
            tracing::warn!(id = %hit.id, error = %e, "usage count update failed");
        }
    }
}

fn shape_hit(hit: &ScoredPoint) -> Option<SearchHit> {
    let payload: ChunkPayload = serde_json::from_value(hit.payload.clone()).ok()?;
    Some(SearchHit {
        id: hit.id.clone(),
        score: hit.score,
        preview: preview(&payload.text),
        payload,
    })
}
