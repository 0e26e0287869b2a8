//! # scholar-rag
//!
//! Retrieval-augmented generation building blocks for a local library of
//! research documents.
//!
//! Ingestion flows left to right:
//!
//! ```text
//! folder ─► discover_documents ─► Document::load ─► Chunker ─► BatchEmbedder ─► VectorStore
//! ```
//!
//! and queries go through [`RagPipeline::query`], which embeds the query text
//! and asks the store for the nearest chunks under cosine distance.
//!
//! ## Components
//!
//! - [`RecursiveChunker`]: separator-aware splitting with overlap
//! - [`BatchEmbedder`]: batched embedding with pacing and per-text fallback
//! - [`OllamaEmbeddingProvider`]: the HTTP [`EmbeddingProvider`]
//! - [`LocalVectorStore`] / [`InMemoryVectorStore`]: [`VectorStore`] backends
//! - [`RagPipeline`]: wires the above to one collection
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scholar_rag::*;
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(OllamaEmbeddingProvider::new(OllamaConfig::default())?))
//!     .vector_store(Arc::new(LocalVectorStore::open("chroma_db")?))
//!     .build()?;
//!
//! pipeline.create_collection().await?;
//! pipeline.ingest(&discover_documents("reference_docs")?).await?;
//! for hit in pipeline.query_default("capital of France").await? {
//!     println!("{:.2} {}", hit.similarity(), hit.text);
//! }
//! ```

pub mod chunking;
pub mod collection;
pub mod config;
pub mod discovery;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod loader;
pub mod local;
pub mod ollama;
pub mod pipeline;
pub mod vectorstore;

pub use chunking::{Chunker, DEFAULT_SEPARATORS, RecursiveChunker};
pub use collection::{
    CollectionData, CollectionHandle, DistanceMetric, cosine_similarity, validate_collection_name,
};
pub use config::{RagConfig, RagConfigBuilder};
pub use discovery::discover_documents;
pub use document::{Chunk, Embedding, Metadata, QueryResult, SourceText};
pub use embedding::{BatchEmbedder, EmbeddingProvider, EmbeddingRun, ItemOutcome};
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorStore;
pub use loader::{Document, DocumentKind};
pub use local::LocalVectorStore;
pub use ollama::{OllamaConfig, OllamaEmbeddingProvider};
pub use pipeline::{DEFAULT_COLLECTION, IngestReport, RagPipeline, RagPipelineBuilder};
pub use vectorstore::VectorStore;
