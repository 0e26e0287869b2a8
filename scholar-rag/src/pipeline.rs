//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates the full ingest-and-query workflow by
//! composing a [`Chunker`], a [`BatchEmbedder`] over an
//! [`EmbeddingProvider`], and a [`VectorStore`], all bound to one collection.
//!
//! Errors from every stage are returned unchanged. Ingestion is not
//! transactional across calls: entries stored by an earlier `ingest` stay
//! stored when a later one fails.
//!
//! # Example
//!
//! ```rust,ignore
//! use scholar_rag::{LocalVectorStore, OllamaConfig, OllamaEmbeddingProvider, RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(OllamaEmbeddingProvider::new(OllamaConfig::default())?))
//!     .vector_store(Arc::new(LocalVectorStore::open("chroma_db")?))
//!     .collection("research_papers")
//!     .build()?;
//!
//! pipeline.create_collection().await?;
//! pipeline.ingest(&paths).await?;
//! let results = pipeline.query("search query", 5).await?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::collection::{CollectionHandle, validate_collection_name};
use crate::config::RagConfig;
use crate::document::{Chunk, QueryResult};
use crate::embedding::{BatchEmbedder, EmbeddingProvider};
use crate::error::{RagError, Result};
use crate::loader::Document;
use crate::vectorstore::VectorStore;

/// Collection used when the builder is not given one.
pub const DEFAULT_COLLECTION: &str = "research_papers";

/// Summary of one [`RagPipeline::ingest`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Number of documents loaded.
    pub documents: usize,
    /// Number of chunks produced across all documents.
    pub chunks: usize,
    /// Number of chunks embedded and stored.
    pub embedded: usize,
    /// Number of chunks dropped because their text could not be embedded.
    pub skipped: usize,
    /// Ids assigned to the stored chunks, in chunk order.
    pub ids: Vec<String>,
}

/// The RAG pipeline orchestrator.
///
/// Coordinates document ingestion (load → chunk → embed → store) and query
/// execution (embed → search). Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedder: BatchEmbedder,
    vector_store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
    collection: String,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        self.embedder.provider()
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// The collection this pipeline reads and writes.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Create the pipeline's collection, or resolve to it if it exists.
    pub async fn create_collection(&self) -> Result<CollectionHandle> {
        self.vector_store.create_collection(&self.collection).await
    }

    /// Load and chunk every document, then embed the chunks and store them.
    ///
    /// Chunks keep document-list order and, within a document, split order.
    /// Loading stops at the first document that fails, before anything is
    /// embedded. Chunks whose text fails to embed are dropped and counted in
    /// [`IngestReport::skipped`].
    ///
    /// # Errors
    ///
    /// - [`RagError::UnsupportedFormat`] / [`RagError::LoadFailure`] for a bad document.
    /// - [`RagError::ProviderUnavailable`] / [`RagError::DimensionMismatch`] from embedding.
    /// - [`RagError::CollectionNotFound`] / [`RagError::StoreWriteFailure`] from the store.
    #[instrument(skip_all, fields(collection = %self.collection, documents = paths.len()))]
    pub async fn ingest(&self, paths: &[PathBuf]) -> Result<IngestReport> {
        let mut chunks: Vec<Chunk> = Vec::new();
        for path in paths {
            let document = Document::from_path(path)?;
            let sources = document.load()?;
            let before = chunks.len();
            for source in &sources {
                chunks.extend(self.chunker.chunk(source));
            }
            debug!(
                path = %path.display(),
                kind = %document.kind,
                chunk_count = chunks.len() - before,
                "chunked document"
            );
        }

        let mut report =
            IngestReport { documents: paths.len(), chunks: chunks.len(), ..IngestReport::default() };
        if chunks.is_empty() {
            info!("no text to ingest");
            return Ok(report);
        }
        info!(chunk_count = chunks.len(), "split documents into chunks");

        let run = {
            let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
            self.embedder.embed(&texts).await?
        };
        let (chunks, embeddings): (Vec<Chunk>, Vec<_>) = run.align(chunks)?.into_iter().unzip();

        report.embedded = chunks.len();
        report.skipped = report.chunks - report.embedded;
        report.ids = self.vector_store.add(&self.collection, &chunks, &embeddings).await?;

        info!(
            chunk_count = report.chunks,
            embedded = report.embedded,
            skipped = report.skipped,
            "ingested documents"
        );
        Ok(report)
    }

    /// Embed `text` and return up to `n_results` stored chunks, nearest first.
    ///
    /// # Errors
    ///
    /// Returns the embedding client's or the store's error unchanged,
    /// including [`RagError::CollectionNotFound`].
    #[instrument(skip_all, fields(collection = %self.collection, n_results = n_results))]
    pub async fn query(&self, text: &str, n_results: usize) -> Result<Vec<QueryResult>> {
        let embedding = self.embedder.embed_query(text).await?;
        let results = self.vector_store.query(&self.collection, &embedding, n_results).await?;
        info!(result_count = results.len(), "query completed");
        Ok(results)
    }

    /// [`query`](Self::query) with the configured `top_k`.
    pub async fn query_default(&self, text: &str) -> Result<Vec<QueryResult>> {
        self.query(text, self.config.top_k).await
    }

    /// Number of entries in the pipeline's collection.
    pub async fn count(&self) -> Result<usize> {
        self.vector_store.count(&self.collection).await
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config`, `embedding_provider` and `vector_store` are required. The
/// collection defaults to [`DEFAULT_COLLECTION`] and the chunker to a
/// [`RecursiveChunker`] built from the config.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RagPipeline::builder()
///     .config(RagConfig::default())
///     .embedding_provider(Arc::new(embedder))
///     .vector_store(Arc::new(store))
///     .collection("papers")  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
    collection: Option<String>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Replace the default recursive chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing and
    /// [`RagError::InvalidCollectionName`] for an unusable collection name.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let collection = self.collection.unwrap_or_else(|| DEFAULT_COLLECTION.to_string());
        validate_collection_name(&collection)?;

        let chunker = self
            .chunker
            .unwrap_or_else(|| Arc::new(RecursiveChunker::from_config(&config)));
        let embedder = BatchEmbedder::from_config(embedding_provider, &config);

        Ok(RagPipeline { config, embedder, vector_store, chunker, collection })
    }
}
