//! Data types for loaded text, chunks, and query results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Key-value provenance attached to loaded text and to every chunk.
pub type Metadata = HashMap<String, String>;

/// A vector embedding. Its length is fixed per run by the provider.
pub type Embedding = Vec<f32>;

/// Metadata key naming the file a chunk came from.
pub const SOURCE_KEY: &str = "source";
/// Metadata key for the zero-based PDF page a chunk came from.
pub const PAGE_KEY: &str = "page";
/// Reserved metadata key recording the chunk size used.
pub const CHUNK_SIZE_KEY: &str = "chunk_size";
/// Reserved metadata key recording the chunk overlap used.
pub const CHUNK_OVERLAP_KEY: &str = "chunk_overlap";

/// A unit of text produced by a document loader, before chunking.
///
/// Plain-text and word-processor files yield one of these; PDFs yield
/// one per non-empty page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceText {
    /// The extracted text.
    pub text: String,
    /// Provenance of the text (at least [`SOURCE_KEY`]).
    pub metadata: Metadata,
}

impl SourceText {
    /// Create a source text tagged with the file it came from.
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert(SOURCE_KEY.to_string(), source.into());
        Self { text: text.into(), metadata }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A bounded slice of a document's text plus its provenance.
///
/// Chunks carry no id: ids are assigned by the vector store when the chunk is added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// The text content of the chunk.
    pub content: String,
    /// Source metadata plus the reserved `chunk_size` / `chunk_overlap` keys.
    pub metadata: Metadata,
}

/// A stored chunk returned from a similarity query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    /// The id assigned when the chunk was added.
    pub id: String,
    /// The stored chunk text.
    pub text: String,
    /// The stored chunk metadata.
    pub metadata: Metadata,
    /// Raw cosine distance to the query (smaller is nearer).
    pub distance: f32,
}

impl QueryResult {
    /// Similarity derived from the distance, `1 - distance`.
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}
