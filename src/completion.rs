//! Completion model abstraction and the OpenAI chat implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::ChatConfig;
use crate::error::PipelineError;

/// A text-completion model used by the answer synthesizer.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run a single system + user prompt exchange and return the raw
    /// model output.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, PipelineError>;
}

/// Completion client for the OpenAI `POST /v1/chat/completions` endpoint.
pub struct OpenAiCompletion {
    model: String,
    client: Client,
}

impl OpenAiCompletion {
    pub fn new(config: &ChatConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::CompletionService(e.to_string()))?;

        Ok(Self {
            model: config.model.clone(),
            client,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletion {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, PipelineError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            PipelineError::CompletionService("OPENAI_API_KEY not set in environment".to_string())
        })?;

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::CompletionService(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::CompletionService(format!(
                "chat completions API error {}: {}",
                status, body_text
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| PipelineError::CompletionService(e.to_string()))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                PipelineError::CompletionService(
                    "malformed response: missing message content".to_string(),
                )
            })?;

        Ok(content.to_string())
    }
}
