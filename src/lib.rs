//! # Paperbase
//!
//! **A retrieval-augmented question answering service for journal
//! articles.**
//!
//! Paperbase ingests documents (PDFs or pre-chunked JSON records),
//! splits them into bounded word-window chunks, embeds the chunks via
//! an OpenAI-compatible embeddings API, and stores them in a Qdrant
//! collection. Questions are answered by embedding the query, fetching
//! the most similar chunks, and handing them to a chat-completion model
//! for grounded synthesis with citations.
//!
//! ## Data Flow
//!
//! 1. **Extraction** ([`extract`]) turns a PDF into one text string per
//!    page; JSON input arrives pre-chunked and skips this step.
//! 2. The **chunker** ([`chunker`]) windows each page into chunks of at
//!    most `max_words` words.
//! 3. The **embedder** ([`embedding`]) converts chunk texts (and later,
//!    queries) into fixed-dimensionality vectors.
//! 4. The **vector store** ([`store`]) holds `(id, vector, payload)`
//!    points in a cosine-distance collection.
//! 5. The **retriever** ([`retrieve`]) embeds queries, searches the
//!    collection, bumps per-chunk usage counters best-effort, and
//!    shapes results.
//! 6. The **answerer** ([`answer`]) grounds a completion model in the
//!    retrieved chunks and returns an answer with sources.
//!
//! All external calls (embeddings, vector store, completions) are
//! single synchronous round-trips with no retries; requests share no
//! in-process mutable state.

pub mod answer;
pub mod chunker;
pub mod completion;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod models;
pub mod retrieve;
pub mod store;
