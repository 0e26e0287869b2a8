//! In-memory vector store using cosine distance.
//!
//! This module provides [`InMemoryVectorStore`], a process-local vector store
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is suitable
//! for tests and for embedding the pipeline where durability is not needed.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::collection::{CollectionData, CollectionHandle, collection_not_found, validate_collection_name};
use crate::document::{Chunk, Embedding, QueryResult};
use crate::error::Result;
use crate::vectorstore::VectorStore;

/// An in-memory vector store.
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("docs").await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, CollectionData>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str) -> Result<CollectionHandle> {
        validate_collection_name(name)?;
        let mut collections = self.collections.write().await;
        let data =
            collections.entry(name.to_string()).or_insert_with(|| CollectionData::new(name));
        Ok(data.handle())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn add(
        &self,
        collection: &str,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<Vec<String>> {
        let mut collections = self.collections.write().await;
        let data = collections
            .get_mut(collection)
            .ok_or_else(|| collection_not_found(collection))?;
        let ids = data.append(chunks, embeddings)?;
        info!(collection, added = ids.len(), "added entries to collection");
        Ok(ids)
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<QueryResult>> {
        let collections = self.collections.read().await;
        let data = collections
            .get(collection)
            .ok_or_else(|| collection_not_found(collection))?;
        data.nearest(embedding, n_results)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .map(CollectionData::len)
            .ok_or_else(|| collection_not_found(collection))
    }
}
