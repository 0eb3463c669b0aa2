use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::error::PipelineError;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_url")]
    pub url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            collection: default_collection(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_store_url() -> String {
    std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6333".to_string())
}
fn default_collection() -> String {
    "chunks".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dims")]
    pub dims: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dims: default_dims(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_dims() -> usize {
    1536
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_max_tokens() -> u32 {
    500
}
fn default_temperature() -> f32 {
    0.7
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Defaults for the general-purpose similarity search entry point.
    #[serde(default = "default_search_k")]
    pub search_k: usize,
    #[serde(default = "default_search_min_score")]
    pub search_min_score: f32,
    /// Defaults for the question-answering entry point.
    #[serde(default = "default_ask_k")]
    pub ask_k: usize,
    #[serde(default = "default_ask_min_score")]
    pub ask_min_score: f32,
    /// Maximum chunks returned when listing a document by id.
    #[serde(default = "default_doc_list_cap")]
    pub doc_list_cap: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            search_k: default_search_k(),
            search_min_score: default_search_min_score(),
            ask_k: default_ask_k(),
            ask_min_score: default_ask_min_score(),
            doc_list_cap: default_doc_list_cap(),
        }
    }
}

fn default_search_k() -> usize {
    10
}
fn default_search_min_score() -> f32 {
    0.25
}
fn default_ask_k() -> usize {
    3
}
fn default_ask_min_score() -> f32 {
    0.2
}
fn default_doc_list_cap() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_words")]
    pub max_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_words: default_max_words(),
        }
    }
}

fn default_max_words() -> usize {
    500
}

/// Load the TOML configuration, falling back to built-in defaults when
/// the file does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), PipelineError> {
    if config.chunking.max_words == 0 {
        return Err(PipelineError::Config(
            "chunking.max_words must be > 0".to_string(),
        ));
    }
    if config.embedding.dims == 0 {
        return Err(PipelineError::Config(
            "embedding.dims must be > 0".to_string(),
        ));
    }
    if config.retrieval.search_k == 0 || config.retrieval.ask_k == 0 {
        return Err(PipelineError::Config(
            "retrieval.search_k and retrieval.ask_k must be >= 1".to_string(),
        ));
    }
    if !(0.0..=2.0).contains(&config.chat.temperature) {
        return Err(PipelineError::Config(
            "chat.temperature must be in [0.0, 2.0]".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("/nonexistent/paperbase.toml")).unwrap();
        assert_eq!(config.embedding.dims, 1536);
        assert_eq!(config.retrieval.ask_k, 3);
        assert_eq!(config.retrieval.doc_list_cap, 100);
        assert_eq!(config.chunking.max_words, 500);
    }

    #[test]
    fn partial_file_keeps_section_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retrieval]\nsearch_k = 5").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.retrieval.search_k, 5);
        assert_eq!(config.retrieval.search_min_score, 0.25);
        assert_eq!(config.chat.max_tokens, 500);
    }

    #[test]
    fn zero_max_words_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chunking]\nmax_words = 0").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn validation_failures_are_config_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chat]\ntemperature = 3.5").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Config(_))
        ));
    }
}
