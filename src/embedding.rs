//! Embedding provider abstraction and the OpenAI implementation.
//!
//! The [`Embedder`] trait converts an ordered batch of texts into an
//! equal-length ordered batch of fixed-dimensionality vectors. Batching
//! is the unit of API interaction: callers assemble batches themselves,
//! and no deduplication or caching of repeated texts is performed.
//!
//! There is deliberately no retry logic here — the caller owns retry
//! policy.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::PipelineError;

/// Converts texts into fixed-dimensionality embedding vectors.
///
/// Position `i` of the output always corresponds to position `i` of the
/// input.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// The vector dimensionality this embedder produces (e.g. `1536`).
    fn dims(&self) -> usize;

    /// Embed an ordered batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError>;
}

/// Embedding client for the OpenAI `POST /v1/embeddings` endpoint.
///
/// Requires the `OPENAI_API_KEY` environment variable; its absence is
/// detected before any network call is made.
pub struct OpenAiEmbedder {
    model: String,
    dims: usize,
    client: Client,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::EmbeddingService(e.to_string()))?;

        Ok(Self {
            model: config.model.clone(),
            dims: config.dims,
            client,
        })
    }

    fn api_key() -> Result<String, PipelineError> {
        std::env::var("OPENAI_API_KEY").map_err(|_| {
            PipelineError::EmbeddingService("OPENAI_API_KEY not set in environment".to_string())
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
        // Fail-fast credential check, before any network traffic.
        let api_key = Self::api_key()?;

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let response = self
            .client
            .post("https://api.openai.com/v1/embeddings")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::EmbeddingService(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::EmbeddingService(format!(
                "embeddings API error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PipelineError::EmbeddingService(e.to_string()))?;

        let vectors = parse_embeddings_response(&json, texts.len(), self.dims)?;
        Ok(vectors)
    }
}

/// Parse the embeddings API response, restoring input order via the
/// per-item `index` field and checking length and dimensionality.
fn parse_embeddings_response(
    json: &serde_json::Value,
    expected_len: usize,
    expected_dims: usize,
) -> Result<Vec<Vec<f32>>, PipelineError> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| {
            PipelineError::EmbeddingService("malformed response: missing data array".to_string())
        })?;

    if data.len() != expected_len {
        return Err(PipelineError::EmbeddingService(format!(
            "malformed response: {} embeddings for {} inputs",
            data.len(),
            expected_len
        )));
    }

    let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());
    for item in data {
        let index = item
            .get("index")
            .and_then(|i| i.as_u64())
            .ok_or_else(|| {
                PipelineError::EmbeddingService("malformed response: missing index".to_string())
            })? as usize;

        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| {
                PipelineError::EmbeddingService(
                    "malformed response: missing embedding".to_string(),
                )
            })?;

        let vector: Vec<f32> = embedding
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        if vector.len() != expected_dims {
            return Err(PipelineError::EmbeddingService(format!(
                "unexpected dimensionality {} (expected {})",
                vector.len(),
                expected_dims
            )));
        }

        indexed.push((index, vector));
    }

    indexed.sort_by_key(|(i, _)| *i);
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_reordered_by_index() {
        let json = serde_json::json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] },
            ]
        });
        let vectors = parse_embeddings_response(&json, 2, 2).unwrap();
        assert_eq!(vectors[0], vec![1.0, 0.0]);
        assert_eq!(vectors[1], vec![0.0, 1.0]);
    }

    #[test]
    fn length_mismatch_is_malformed() {
        let json = serde_json::json!({
            "data": [{ "index": 0, "embedding": [1.0, 0.0] }]
        });
        let err = parse_embeddings_response(&json, 2, 2).unwrap_err();
        assert!(matches!(err, PipelineError::EmbeddingService(_)));
    }

    #[test]
    fn wrong_dims_is_malformed() {
        let json = serde_json::json!({
            "data": [{ "index": 0, "embedding": [1.0, 0.0, 0.5] }]
        });
        let err = parse_embeddings_response(&json, 1, 2).unwrap_err();
        assert!(matches!(err, PipelineError::EmbeddingService(_)));
    }

    #[test]
    fn missing_data_is_malformed() {
        let json = serde_json::json!({ "error": "nope" });
        assert!(parse_embeddings_response(&json, 1, 2).is_err());
    }
}
