//! Qdrant [`VectorStore`] implementation over the REST API.
//!
//! Talks plain JSON to a Qdrant instance: collection lifecycle via
//! `GET/PUT /collections/{name}`, writes via
//! `PUT /collections/{name}/points?wait=true`, searches via
//! `POST /collections/{name}/points/search`, and payload merges via
//! `POST /collections/{name}/points/payload?wait=true`.
//!
//! Filter-only listing reuses the search endpoint with an all-zero
//! query vector because this Qdrant surface offers no ranked listing
//! without one. The zero vector is a deliberate placeholder; scores on
//! the listed points are discarded. The workaround lives only inside
//! [`QdrantStore::list_by_filter`], never in genuine similarity search.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::StoreConfig;
use crate::error::PipelineError;

use super::{PointRecord, ScoredPoint, VectorStore};

pub struct QdrantStore {
    base_url: String,
    collection: String,
    /// Collection dimensionality, needed for the zero-vector listing.
    dims: usize,
    client: Client,
}

impl QdrantStore {
    pub fn new(config: &StoreConfig, dims: usize) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::StoreWrite(e.to_string()))?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            dims,
            client,
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    async fn run_search(&self, body: Value) -> Result<Vec<ScoredPoint>, PipelineError> {
        let url = format!("{}/points/search", self.collection_url());
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::StoreRead(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::StoreRead(format!(
                "search failed with {}: {}",
                status, body_text
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| PipelineError::StoreRead(e.to_string()))?;

        let result = payload
            .get("result")
            .and_then(|r| r.as_array())
            .ok_or_else(|| {
                PipelineError::StoreRead("malformed search response: missing result".to_string())
            })?;

        let mut hits = Vec::with_capacity(result.len());
        for item in result {
            hits.push(ScoredPoint {
                id: point_id_string(item.get("id")),
                score: item.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0) as f32,
                payload: item.get("payload").cloned().unwrap_or_else(|| json!({})),
            });
        }
        Ok(hits)
    }
}

/// Qdrant point ids are either unsigned integers or UUID strings.
fn point_id_string(id: Option<&Value>) -> String {
    match id {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn ensure_collection(&self, dims: usize) -> Result<(), PipelineError> {
        let probe = self
            .client
            .get(self.collection_url())
            .send()
            .await
            .map_err(|e| PipelineError::StoreRead(e.to_string()))?;

        if probe.status().is_success() {
            return Ok(());
        }

        let body = json!({
            "vectors": { "size": dims, "distance": "Cosine" }
        });

        let response = self
            .client
            .put(self.collection_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::StoreWrite(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(collection = %self.collection, dims, "created vector collection");
            return Ok(());
        }

        // A racing creator may have won between probe and create; the
        // store reports this as a conflict and we treat it as success.
        let body_text = response.text().await.unwrap_or_default();
        if status.as_u16() == 409 || body_text.contains("already exists") {
            return Ok(());
        }

        Err(PipelineError::StoreWrite(format!(
            "collection create failed with {}: {}",
            status, body_text
        )))
    }

    async fn upsert(&self, points: Vec<PointRecord>) -> Result<(), PipelineError> {
        let body = json!({
            "points": points
                .iter()
                .map(|p| json!({
                    "id": p.id,
                    "vector": p.vector,
                    "payload": p.payload,
                }))
                .collect::<Vec<_>>()
        });

        let url = format!("{}/points?wait=true", self.collection_url());
        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::StoreWrite(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::StoreWrite(format!(
                "upsert failed with {}: {}",
                status, body_text
            )));
        }
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        k: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredPoint>, PipelineError> {
        let body = json!({
            "vector": vector,
            "limit": k,
            "score_threshold": min_score,
            "with_payload": true,
        });
        self.run_search(body).await
    }

    async fn list_by_filter(
        &self,
        field: &str,
        value: &str,
        cap: usize,
    ) -> Result<Vec<ScoredPoint>, PipelineError> {
        // Zero query vector: we only want the filter applied, not the
        // similarity ranking.
        let body = json!({
            "vector": vec![0.0f32; self.dims],
            "limit": cap,
            "with_payload": true,
            "with_vectors": false,
            "filter": {
                "must": [
                    { "key": field, "match": { "value": value } }
                ]
            }
        });
        self.run_search(body).await
    }

    async fn set_payload(&self, id: &str, payload: Value) -> Result<(), PipelineError> {
        let body = json!({
            "payload": payload,
            "points": [id],
        });

        let url = format!("{}/points/payload?wait=true", self.collection_url());
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::StoreWrite(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::StoreWrite(format!(
                "set_payload failed with {}: {}",
                status, body_text
            )));
        }
        Ok(())
    }
}
