//! Durable vector store rooted at a local directory.
//!
//! Each collection is one snapshot file, `<root>/<name>.collection`, holding
//! the JSON-encoded [`CollectionData`] followed by an 8-byte footer:
//! `[magic "SRC1"][CRC32 of the payload, big-endian]`. Writes go to a temp
//! file that is renamed over the snapshot, so a crash never leaves a
//! half-written collection. Snapshots are loaded lazily on first use.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::collection::{CollectionData, CollectionHandle, collection_not_found, validate_collection_name};
use crate::document::{Chunk, Embedding, QueryResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const SNAPSHOT_EXTENSION: &str = "collection";
const SNAPSHOT_CRC_MAGIC: &[u8; 4] = b"SRC1";
const BACKEND: &str = "local";

/// A [`VectorStore`] persisted to a directory.
///
/// Reopening the same directory sees every collection and entry added
/// before. A single process is assumed to own the directory at a time.
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rag::{LocalVectorStore, VectorStore};
///
/// let store = LocalVectorStore::open("chroma_db")?;
/// store.create_collection("research_papers").await?;
/// ```
#[derive(Debug)]
pub struct LocalVectorStore {
    root: PathBuf,
    collections: RwLock<HashMap<String, CollectionData>>,
}

impl LocalVectorStore {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::VectorStoreError`] if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| store_error(format!(
            "failed to create store directory {}: {e}",
            root.display()
        )))?;
        info!(path = %root.display(), "opened local vector store");
        Ok(Self { root, collections: RwLock::new(HashMap::new()) })
    }

    /// The directory holding the snapshots.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{SNAPSHOT_EXTENSION}"))
    }

    /// Make sure `name` is in the cache, loading its snapshot if one exists.
    /// Returns `false` if the collection was never created.
    fn ensure_loaded(
        &self,
        collections: &mut HashMap<String, CollectionData>,
        name: &str,
    ) -> Result<bool> {
        if collections.contains_key(name) {
            return Ok(true);
        }
        let path = self.snapshot_path(name);
        if !path.exists() {
            return Ok(false);
        }
        let data = load_snapshot(&path, name)?;
        collections.insert(name.to_string(), data);
        Ok(true)
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn create_collection(&self, name: &str) -> Result<CollectionHandle> {
        validate_collection_name(name)?;
        let mut collections = self.collections.write().await;
        if self.ensure_loaded(&mut collections, name)? {
            debug!(collection = name, "collection already exists, reusing it");
            return Ok(collections[name].handle());
        }

        let data = CollectionData::new(name);
        save_snapshot(&self.snapshot_path(name), &data).map_err(|e| {
            error!(collection = name, error = %e, "failed to create collection");
            RagError::StoreWriteFailure { collection: name.to_string(), message: e.to_string() }
        })?;
        info!(collection = name, metric = %data.metric, "created collection");

        let handle = data.handle();
        collections.insert(name.to_string(), data);
        Ok(handle)
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        validate_collection_name(name)?;
        let mut collections = self.collections.write().await;
        collections.remove(name);
        match fs::remove_file(self.snapshot_path(name)) {
            Ok(()) => {
                info!(collection = name, "deleted collection");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(store_error(format!("failed to delete collection '{name}': {e}"))),
        }
    }

    async fn add(
        &self,
        collection: &str,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<Vec<String>> {
        validate_collection_name(collection)?;
        let mut collections = self.collections.write().await;
        if !self.ensure_loaded(&mut collections, collection)? {
            return Err(collection_not_found(collection));
        }
        let Some(current) = collections.get_mut(collection) else {
            return Err(collection_not_found(collection));
        };

        // Build the next state aside; the cache only changes once it is on disk.
        let mut next = current.clone();
        let ids = next.append(chunks, embeddings)?;
        if ids.is_empty() {
            return Ok(ids);
        }

        save_snapshot(&self.snapshot_path(collection), &next).map_err(|e| {
            error!(collection, error = %e, "failed to persist collection");
            RagError::StoreWriteFailure { collection: collection.to_string(), message: e.to_string() }
        })?;
        *current = next;

        info!(collection, added = ids.len(), total = current.len(), "added entries to collection");
        Ok(ids)
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<QueryResult>> {
        validate_collection_name(collection)?;
        let mut collections = self.collections.write().await;
        if !self.ensure_loaded(&mut collections, collection)? {
            return Err(collection_not_found(collection));
        }
        collections[collection].nearest(embedding, n_results)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        validate_collection_name(collection)?;
        let mut collections = self.collections.write().await;
        if !self.ensure_loaded(&mut collections, collection)? {
            return Err(collection_not_found(collection));
        }
        Ok(collections[collection].len())
    }
}

fn store_error(message: String) -> RagError {
    RagError::VectorStoreError { backend: BACKEND.to_string(), message }
}

/// Write a snapshot atomically: temp file, then rename over the target.
fn save_snapshot(path: &Path, data: &CollectionData) -> io::Result<()> {
    let payload = serde_json::to_vec(data).map_err(io::Error::other)?;
    let crc = crc32fast::hash(&payload);

    let mut output = Vec::with_capacity(payload.len() + 8);
    output.extend_from_slice(&payload);
    output.extend_from_slice(SNAPSHOT_CRC_MAGIC);
    output.extend_from_slice(&crc.to_be_bytes());

    let tmp_path = path.with_extension(format!("{SNAPSHOT_EXTENSION}.tmp"));
    fs::write(&tmp_path, &output)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    debug!(
        collection = %data.name,
        bytes = payload.len(),
        crc = format_args!("{crc:#010x}"),
        "saved collection snapshot"
    );
    Ok(())
}

/// Load and verify a snapshot written by [`save_snapshot`].
fn load_snapshot(path: &Path, name: &str) -> Result<CollectionData> {
    let raw = fs::read(path)
        .map_err(|e| store_error(format!("failed to read {}: {e}", path.display())))?;

    if raw.len() < 8 || &raw[raw.len() - 8..raw.len() - 4] != SNAPSHOT_CRC_MAGIC {
        return Err(store_error(format!("{} is not a collection snapshot", path.display())));
    }
    let payload = &raw[..raw.len() - 8];
    let mut stored = [0u8; 4];
    stored.copy_from_slice(&raw[raw.len() - 4..]);
    let stored_crc = u32::from_be_bytes(stored);
    let computed_crc = crc32fast::hash(payload);
    if stored_crc != computed_crc {
        return Err(store_error(format!(
            "snapshot CRC32 mismatch for {}: expected {stored_crc:#010x}, got {computed_crc:#010x}",
            path.display()
        )));
    }

    let data: CollectionData = serde_json::from_slice(payload)
        .map_err(|e| store_error(format!("failed to decode {}: {e}", path.display())))?;
    if data.name != name {
        return Err(store_error(format!(
            "{} holds collection '{}', expected '{name}'",
            path.display(),
            data.name
        )));
    }
    data.validate()
        .map_err(|e| store_error(format!("snapshot validation failed for '{name}': {e}")))?;

    info!(collection = name, entries = data.len(), "loaded collection");
    Ok(data)
}
