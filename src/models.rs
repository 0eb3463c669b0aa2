//! Core data models for the ingestion and retrieval pipeline.
//!
//! These types represent the chunks, payloads, and result shapes that
//! flow between the chunker, the embedder, the vector store, and the
//! answer synthesizer.

use serde::{Deserialize, Serialize};

/// Preview length for shaped search results, in characters.
pub const PREVIEW_CHARS: usize = 200;

/// A unit of retrievable text produced during ingestion.
///
/// `id` is always a freshly generated UUID acceptable to the vector
/// store. When a structured-input record arrives with its own external
/// identifier, that identifier survives in `original_id`.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub original_id: Option<String>,
    pub source_doc_id: String,
    pub section_heading: String,
    pub journal: String,
    pub publish_year: i32,
    pub attributes: Vec<String>,
    pub usage_count: u64,
    pub text: String,
}

/// A pre-formed chunk record from the structured (JSON) ingest path.
///
/// Mirrors the upload format: most fields are optional and default to
/// neutral values; only `source_doc_id` and `text` are required.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkRecord {
    /// External identifier, preserved as `original_id` after ingest.
    #[serde(default)]
    pub id: Option<String>,
    pub source_doc_id: String,
    #[serde(default)]
    pub section_heading: String,
    #[serde(default = "default_journal")]
    pub journal: String,
    #[serde(default)]
    pub publish_year: i32,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub usage_count: u64,
    pub text: String,
}

fn default_journal() -> String {
    "unknown".to_string()
}

/// The payload stored alongside each vector in the collection.
///
/// `original_id` falls back to the store id when no external identifier
/// was supplied, so the field is always present in stored points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub original_id: String,
    pub source_doc_id: String,
    pub section_heading: String,
    pub journal: String,
    pub publish_year: i32,
    pub usage_count: u64,
    pub attributes: Vec<String>,
    pub text: String,
}

impl From<&Chunk> for ChunkPayload {
    fn from(chunk: &Chunk) -> Self {
        Self {
            original_id: chunk
                .original_id
                .clone()
                .unwrap_or_else(|| chunk.id.clone()),
            source_doc_id: chunk.source_doc_id.clone(),
            section_heading: chunk.section_heading.clone(),
            journal: chunk.journal.clone(),
            publish_year: chunk.publish_year,
            usage_count: chunk.usage_count,
            attributes: chunk.attributes.clone(),
            text: chunk.text.clone(),
        }
    }
}

/// A shaped similarity-search result returned to callers.
///
/// `preview` is the first [`PREVIEW_CHARS`] characters of the chunk text
/// with a `...` continuation marker when truncated. `payload` is the
/// snapshot taken at search time, before any usage-count increment.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub preview: String,
    pub payload: ChunkPayload,
}

/// A citation entry attached to a synthesized answer.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub id: String,
    pub score: f32,
    pub section_heading: String,
    pub journal: String,
    pub publish_year: i32,
    pub text: String,
}

/// Outcome of an `ask` invocation.
///
/// Failures anywhere in the chain become `Failed` carrying the original
/// query, so the caller always receives a response shape rather than a
/// propagated fault.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChatOutcome {
    Answered {
        answer: String,
        sources: Vec<SourceRef>,
        query: String,
    },
    Failed {
        error: String,
        query: String,
    },
}

/// Truncate `text` to [`PREVIEW_CHARS`] characters, appending `...`
/// when the original is longer.
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_short_text_unchanged() {
        assert_eq!(preview("hello"), "hello");
    }

    #[test]
    fn preview_truncates_with_marker() {
        let long = "x".repeat(450);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn preview_exact_boundary_has_no_marker() {
        let exact = "y".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&exact), exact);
    }

    #[test]
    fn payload_original_id_falls_back_to_store_id() {
        let chunk = Chunk {
            id: "uuid-1".to_string(),
            original_id: None,
            source_doc_id: "doc".to_string(),
            section_heading: "page_1".to_string(),
            journal: "unknown".to_string(),
            publish_year: 0,
            attributes: vec![],
            usage_count: 0,
            text: "body".to_string(),
        };
        let payload = ChunkPayload::from(&chunk);
        assert_eq!(payload.original_id, "uuid-1");
    }

    #[test]
    fn chunk_record_defaults() {
        let record: ChunkRecord =
            serde_json::from_str(r#"{"source_doc_id": "d1", "text": "t"}"#).unwrap();
        assert_eq!(record.journal, "unknown");
        assert_eq!(record.usage_count, 0);
        assert_eq!(record.publish_year, 0);
        assert!(record.id.is_none());
    }
}
