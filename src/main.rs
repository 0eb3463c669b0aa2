//! # Paperbase CLI
//!
//! Command-line surface for the ingestion and retrieval pipelines.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `paperbase init` | Create the vector collection if absent |
//! | `paperbase ingest <file>` | Ingest a PDF or pre-chunked JSON file |
//! | `paperbase search "<query>"` | Similarity search over indexed chunks |
//! | `paperbase ask "<query>"` | Answer a question from the corpus |
//! | `paperbase doc <id>` | List all chunks of one document |
//!
//! Requires a running Qdrant instance (`QDRANT_URL` or `store.url`) and
//! `OPENAI_API_KEY` in the environment for embedding and completion
//! calls.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use paperbase::answer::Answerer;
use paperbase::completion::OpenAiCompletion;
use paperbase::config::load_config;
use paperbase::embedding::{Embedder, OpenAiEmbedder};
use paperbase::ingest::Ingestor;
use paperbase::models::ChunkRecord;
use paperbase::retrieve::Retriever;
use paperbase::store::qdrant::QdrantStore;
use paperbase::store::VectorStore;

/// Paperbase — retrieval-augmented question answering for journal
/// articles.
#[derive(Parser)]
#[command(
    name = "paperbase",
    about = "Retrieval-augmented question answering for journal articles",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults apply when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/paperbase.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the vector collection if it does not exist yet.
    ///
    /// Idempotent — running it repeatedly, or concurrently with another
    /// first writer, is safe.
    Init,

    /// Ingest a document into the collection.
    ///
    /// `.pdf` files are extracted page by page and chunked; `.json`
    /// files must contain an array of pre-formed chunk records and
    /// bypass extraction and chunking.
    Ingest {
        /// Path to a `.pdf` or `.json` file.
        file: PathBuf,

        /// Journal name recorded on every chunk (PDF path only).
        #[arg(long)]
        journal: Option<String>,

        /// Publication year recorded on every chunk (PDF path only).
        #[arg(long)]
        year: Option<i32>,
    },

    /// Similarity search over indexed chunks.
    Search {
        /// The search query text.
        query: String,

        /// Maximum number of hits.
        #[arg(long)]
        k: Option<usize>,

        /// Minimum similarity score for a hit.
        #[arg(long)]
        min_score: Option<f32>,
    },

    /// Answer a question from the indexed corpus, with sources.
    Ask {
        /// The question text.
        query: String,
    },

    /// List all chunks belonging to one source document.
    Doc {
        /// The `source_doc_id` to list (e.g. the uploaded filename).
        id: String,
    },
}

/// Lowercased file extension, so `paper.PDF` picks the same ingest
/// path as `paper.pdf`.
fn file_extension(path: &std::path::Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    // One client per external dependency for the whole process; shared
    // read-only across commands.
    let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::new(&config.embedding)?);
    let store: Arc<dyn VectorStore> =
        Arc::new(QdrantStore::new(&config.store, config.embedding.dims)?);
    let retriever = Arc::new(Retriever::new(embedder.clone(), store.clone()));

    match cli.command {
        Commands::Init => {
            store.ensure_collection(config.embedding.dims).await?;
            println!("collection '{}' ready", config.store.collection);
        }

        Commands::Ingest {
            file,
            journal,
            year,
        } => {
            let ingestor = Ingestor::new(embedder, store, config.chunking.max_words);
            let inserted = match file_extension(&file).as_deref() {
                Some("json") => {
                    let content = std::fs::read_to_string(&file)
                        .with_context(|| format!("Failed to read {}", file.display()))?;
                    let records: Vec<ChunkRecord> = serde_json::from_str(&content)
                        .with_context(|| "Failed to parse chunk records")?;
                    ingestor.ingest_records(records).await?
                }
                Some("pdf") => {
                    let bytes = std::fs::read(&file)
                        .with_context(|| format!("Failed to read {}", file.display()))?;
                    let doc_id = file
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("document.pdf");
                    ingestor
                        .ingest_document(
                            &bytes,
                            doc_id,
                            journal.as_deref().unwrap_or("unknown"),
                            year.unwrap_or(0),
                        )
                        .await?
                }
                _ => bail!("Only .pdf or .json files are supported"),
            };
            println!("inserted {} chunks", inserted);
        }

        Commands::Search {
            query,
            k,
            min_score,
        } => {
            let hits = retriever
                .search(
                    &query,
                    k.unwrap_or(config.retrieval.search_k),
                    min_score.unwrap_or(config.retrieval.search_min_score),
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }

        Commands::Ask { query } => {
            let completion = Arc::new(OpenAiCompletion::new(&config.chat)?);
            let answerer = Answerer::new(
                retriever,
                completion,
                config.chat.clone(),
                &config.retrieval,
            );
            let outcome = answerer.ask(&query).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }

        Commands::Doc { id } => {
            let chunks = retriever
                .document_chunks(&id, config.retrieval.doc_list_cap)
                .await?;
            let out = serde_json::json!({
                "source_doc_id": id,
                "chunks": chunks,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn extension_match_is_case_insensitive() {
        assert_eq!(file_extension(Path::new("paper.PDF")).as_deref(), Some("pdf"));
        assert_eq!(file_extension(Path::new("chunks.Json")).as_deref(), Some("json"));
        assert_eq!(file_extension(Path::new("paper.pdf")).as_deref(), Some("pdf"));
        assert!(file_extension(Path::new("README")).is_none());
    }
}
