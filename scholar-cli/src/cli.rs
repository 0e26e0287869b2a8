//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use scholar_rag::ollama::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use scholar_rag::pipeline::DEFAULT_COLLECTION;
use scholar_rag::{OllamaConfig, RagConfig, Result};

/// Ask questions against a folder of research papers.
///
/// Every option can also be set through the environment variable shown in
/// its help text.
#[derive(Parser, Debug, Clone)]
#[command(name = "scholar", version, about, long_about = None)]
pub struct Args {
    /// Folder scanned recursively for .pdf, .docx, .doc and .txt files
    #[arg(long, env = "SCHOLAR_DOCS_DIR", default_value = "reference_docs")]
    pub docs_dir: PathBuf,

    /// Directory holding the vector store
    #[arg(long, env = "SCHOLAR_STORE_DIR", default_value = "chroma_db")]
    pub store_dir: PathBuf,

    /// Collection to ingest into and query
    #[arg(long, env = "SCHOLAR_COLLECTION", default_value = DEFAULT_COLLECTION)]
    pub collection: String,

    /// Embedding model served by Ollama
    #[arg(long, env = "SCHOLAR_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Ollama server address
    #[arg(long, env = "OLLAMA_URL", default_value = DEFAULT_BASE_URL)]
    pub ollama_url: String,

    /// Maximum characters per chunk
    #[arg(long, env = "SCHOLAR_CHUNK_SIZE", default_value_t = 1000)]
    pub chunk_size: usize,

    /// Characters shared by adjacent chunks
    #[arg(long, env = "SCHOLAR_CHUNK_OVERLAP", default_value_t = 200)]
    pub chunk_overlap: usize,

    /// Texts per embedding request
    #[arg(long, env = "SCHOLAR_BATCH_SIZE", default_value_t = 8)]
    pub batch_size: usize,

    /// Delay after each successful embedding request, in milliseconds (0 = none)
    #[arg(long, env = "SCHOLAR_PACING_MS", default_value_t = 500)]
    pub pacing_ms: u64,

    /// Results shown per query
    #[arg(short = 'n', long, env = "SCHOLAR_RESULTS", default_value_t = 5)]
    pub results: usize,

    /// Per-request timeout for the embedding server, in seconds
    #[arg(long, env = "SCHOLAR_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Query the existing store without scanning or ingesting documents
    #[arg(long, env = "SCHOLAR_SKIP_INGEST", default_value_t = false)]
    pub skip_ingest: bool,
}

impl Args {
    /// Validated pipeline settings.
    pub fn rag_config(&self) -> Result<RagConfig> {
        RagConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .batch_size(self.batch_size)
            .pacing(Duration::from_millis(self.pacing_ms))
            .top_k(self.results)
            .build()
    }

    /// Embedding server settings.
    pub fn ollama_config(&self) -> OllamaConfig {
        OllamaConfig {
            base_url: self.ollama_url.clone(),
            model: self.model.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}
