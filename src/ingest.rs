//! Ingestion pipeline orchestration.
//!
//! Composes extraction → chunking → embedding → vector store upsert for
//! the two ingest paths: page-structured documents (PDF) and pre-chunked
//! JSON records. Any failure aborts the whole ingest; the upsert batch
//! is all-or-nothing per the store's own semantics, so no partial
//! document is ever persisted beyond what the store guarantees.

use std::sync::Arc;

use uuid::Uuid;

use crate::chunker::chunk_pages;
use crate::embedding::Embedder;
use crate::error::PipelineError;
use crate::extract::extract_pages;
use crate::models::{Chunk, ChunkPayload, ChunkRecord};
use crate::store::{PointRecord, VectorStore};

pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    max_words: usize,
}

impl Ingestor {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, max_words: usize) -> Self {
        Self {
            embedder,
            store,
            max_words,
        }
    }

    /// Ingest a page-structured document from raw bytes.
    ///
    /// Chunks carry `usage_count = 0` and no `original_id`. Returns the
    /// number of chunks persisted; a document whose pages all extract
    /// to empty text persists nothing and returns 0.
    pub async fn ingest_document(
        &self,
        bytes: &[u8],
        source_doc_id: &str,
        journal: &str,
        publish_year: i32,
    ) -> Result<usize, PipelineError> {
        let pages = extract_pages(bytes)?;
        let chunks = chunk_pages(source_doc_id, &pages, self.max_words, journal, publish_year);
        tracing::debug!(
            source_doc_id,
            pages = pages.len(),
            chunks = chunks.len(),
            "chunked document"
        );
        self.persist(chunks).await
    }

    /// Ingest pre-formed chunk records from the structured path.
    ///
    /// Each record receives a freshly generated store-compatible id; a
    /// pre-existing external id is preserved as `original_id`, and
    /// `usage_count` defaults to 0 when absent from the input.
    pub async fn ingest_records(
        &self,
        records: Vec<ChunkRecord>,
    ) -> Result<usize, PipelineError> {
        let chunks: Vec<Chunk> = records
            .into_iter()
            .map(|record| Chunk {
                id: Uuid::new_v4().to_string(),
                original_id: record.id,
                source_doc_id: record.source_doc_id,
                section_heading: record.section_heading,
                journal: record.journal,
                publish_year: record.publish_year,
                attributes: record.attributes,
                usage_count: record.usage_count,
                text: record.text,
            })
            .collect();
        self.persist(chunks).await
    }

    async fn persist(&self, chunks: Vec<Chunk>) -> Result<usize, PipelineError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;

        self.store.ensure_collection(self.embedder.dims()).await?;

        let points: Vec<PointRecord> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| {
                let payload = ChunkPayload::from(chunk);
                PointRecord {
                    id: chunk.id.clone(),
                    vector,
                    // ChunkPayload serialization cannot fail: plain
                    // strings, numbers, and string lists.
                    payload: serde_json::to_value(payload)
                        .unwrap_or_else(|_| serde_json::json!({})),
                }
            })
            .collect();

        let inserted = points.len();
        self.store.upsert(points).await?;
        tracing::info!(inserted, "persisted chunks");
        Ok(inserted)
    }
}
