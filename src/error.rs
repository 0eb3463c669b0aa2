//! Error taxonomy for the ingestion and retrieval pipeline.
//!
//! Each variant maps to one external dependency or pipeline stage, so
//! callers can tell a broken document apart from a broken service.
//! There is no retry logic anywhere in the core; retry policy belongs
//! to the caller.

use thiserror::Error;

/// Errors produced by the ingestion, retrieval, and answer pipelines.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source document could not be parsed. Aborts that ingest only.
    #[error("document parse error: {0}")]
    DocumentParse(String),

    /// The embedding service is unreachable, returned a malformed
    /// response, or required credentials are absent.
    #[error("embedding service error: {0}")]
    EmbeddingService(String),

    /// The vector store rejected a write (collection create, upsert,
    /// payload merge).
    #[error("vector store write error: {0}")]
    StoreWrite(String),

    /// The vector store was unavailable or rejected a read.
    #[error("vector store read error: {0}")]
    StoreRead(String),

    /// The completion model call failed.
    #[error("completion service error: {0}")]
    CompletionService(String),

    /// Invalid configuration detected at load time.
    #[error("config error: {0}")]
    Config(String),
}
