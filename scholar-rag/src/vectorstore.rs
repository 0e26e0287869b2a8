//! Vector store trait for storing and searching vector embeddings.

use async_trait::async_trait;

use crate::collection::CollectionHandle;
use crate::document::{Chunk, Embedding, QueryResult};
use crate::error::Result;

/// A storage backend for vector embeddings with cosine similarity search.
///
/// Implementations manage named collections of (id, vector, text, metadata)
/// entries. Ids are assigned by the store on [`add`](VectorStore::add).
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("docs").await?;
/// let ids = store.add("docs", &chunks, &embeddings).await?;
/// let hits = store.query("docs", &query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named cosine collection, or return the existing one.
    async fn create_collection(&self, name: &str) -> Result<CollectionHandle>;

    /// Delete a named collection and all its data. No-op if it does not exist.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Append chunks with their embeddings and return the ids assigned to them.
    ///
    /// Requires `chunks.len() == embeddings.len()`. Either every entry is
    /// added or none is. Existing entries are never modified.
    async fn add(
        &self,
        collection: &str,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<Vec<String>>;

    /// Return up to `n_results` entries nearest to `embedding`, ordered by
    /// ascending cosine distance.
    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<QueryResult>>;

    /// Number of entries stored in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;
}
