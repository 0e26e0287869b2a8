//! Error types for the `scholar-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while ingesting documents or answering queries.
#[derive(Debug, Error)]
pub enum RagError {
    /// The file extension does not map to a known [`DocumentKind`](crate::DocumentKind).
    #[error("Unsupported file format '{extension}' for {}", path.display())]
    UnsupportedFormat {
        /// The rejected file.
        path: PathBuf,
        /// The extension as found on disk (empty if there was none).
        extension: String,
    },

    /// Reading or parsing a document failed.
    #[error("Failed to load {}: {message}", path.display())]
    LoadFailure {
        /// The document that could not be loaded.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// A single call to the embedding provider failed.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A whole batch failed; its texts are retried one at a time.
    #[error("Batch {batch} failed: {message}")]
    BatchEmbedFailure {
        /// One-based batch number within the run.
        batch: usize,
        /// A description of the failure.
        message: String,
    },

    /// Not a single embedding was produced for a non-empty input.
    #[error("No embeddings were generated successfully ({attempted} texts attempted)")]
    ProviderUnavailable {
        /// Number of texts submitted to the provider.
        attempted: usize,
    },

    /// A vector's length disagrees with the dimensionality already established.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The established dimensionality.
        expected: usize,
        /// The offending vector's length.
        actual: usize,
    },

    /// `add` was handed a different number of chunks and embeddings.
    #[error("Got {chunks} chunks but {embeddings} embeddings")]
    LengthMismatch {
        /// Number of chunks.
        chunks: usize,
        /// Number of embeddings.
        embeddings: usize,
    },

    /// The named collection was never created.
    #[error("Collection '{0}' does not exist")]
    CollectionNotFound(String),

    /// The collection name cannot be used as a storage key.
    #[error("Invalid collection name '{0}'")]
    InvalidCollectionName(String),

    /// Persisting a collection failed; nothing from the write was kept.
    #[error("Failed to write collection '{collection}': {message}")]
    StoreWriteFailure {
        /// The collection being written.
        collection: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
