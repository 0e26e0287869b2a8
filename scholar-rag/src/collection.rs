//! Collection contents shared by the vector store backends.
//!
//! A collection holds parallel arrays of ids, embeddings, texts and
//! metadata under one distance metric. The metric and dimensionality are
//! fixed once set.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::document::{Chunk, Embedding, Metadata, QueryResult};
use crate::error::{RagError, Result};

/// Distance used to rank stored vectors against a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// `1 - cos(a, b)`; 0 for identical directions, up to 2 for opposite ones.
    #[default]
    Cosine,
}

impl DistanceMetric {
    /// Distance between two vectors of equal length.
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine => 1.0 - cosine_similarity(a, b),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cosine => f.write_str("cosine"),
        }
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// A handle to a created collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionHandle {
    /// The collection's name, which is also its identity.
    pub name: String,
    /// The metric fixed at creation.
    pub metric: DistanceMetric,
}

/// Log and build the error for a collection that does not exist.
pub(crate) fn collection_not_found(name: &str) -> RagError {
    error!(collection = name, "collection not found");
    RagError::CollectionNotFound(name.to_string())
}

/// Check that a collection name is usable as a storage key.
///
/// # Errors
///
/// Returns [`RagError::InvalidCollectionName`] unless the name is non-empty,
/// not `.` or `..`, and uses only ASCII letters, digits, `_`, `-` and `.`.
pub fn validate_collection_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid { Ok(()) } else { Err(RagError::InvalidCollectionName(name.to_string())) }
}

/// The stored contents of one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionData {
    /// Collection name.
    pub name: String,
    /// Distance metric, fixed at creation.
    pub metric: DistanceMetric,
    /// Dimensionality established by the first added vector.
    pub dimensions: Option<usize>,
    /// Next id to assign. Never decreases.
    pub next_id: u64,
    /// Assigned ids.
    pub ids: Vec<String>,
    /// Stored vectors.
    pub embeddings: Vec<Embedding>,
    /// Stored chunk texts.
    pub documents: Vec<String>,
    /// Stored chunk metadata.
    pub metadatas: Vec<Metadata>,
}

impl CollectionData {
    /// Create an empty cosine collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metric: DistanceMetric::Cosine,
            dimensions: None,
            next_id: 0,
            ids: Vec::new(),
            embeddings: Vec::new(),
            documents: Vec::new(),
            metadatas: Vec::new(),
        }
    }

    /// A handle naming this collection.
    pub fn handle(&self) -> CollectionHandle {
        CollectionHandle { name: self.name.clone(), metric: self.metric }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the collection holds no entries.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Append chunks with their embeddings, returning the assigned ids.
    ///
    /// Ids continue from `next_id`, so the first add to a fresh collection
    /// assigns `"0".."N-1"` and later adds never reuse an id. Everything is
    /// validated before the collection is touched: on error nothing is added.
    ///
    /// # Errors
    ///
    /// - [`RagError::LengthMismatch`] if `chunks` and `embeddings` differ in length.
    /// - [`RagError::DimensionMismatch`] if a vector disagrees with the
    ///   collection's (or the batch's) dimensionality.
    pub fn append(&mut self, chunks: &[Chunk], embeddings: &[Embedding]) -> Result<Vec<String>> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::LengthMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        let mut dimensions = self.dimensions;
        for embedding in embeddings {
            match dimensions {
                None => dimensions = Some(embedding.len()),
                Some(expected) if expected != embedding.len() => {
                    return Err(RagError::DimensionMismatch { expected, actual: embedding.len() });
                }
                Some(_) => {}
            }
        }

        let ids: Vec<String> =
            (self.next_id..self.next_id + chunks.len() as u64).map(|id| id.to_string()).collect();

        self.dimensions = dimensions;
        self.next_id += chunks.len() as u64;
        self.ids.extend(ids.iter().cloned());
        self.embeddings.extend(embeddings.iter().cloned());
        self.documents.extend(chunks.iter().map(|c| c.content.clone()));
        self.metadatas.extend(chunks.iter().map(|c| c.metadata.clone()));

        Ok(ids)
    }

    /// Return up to `n_results` entries nearest to `query`, nearest first.
    /// Equal distances keep insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the query's length differs
    /// from the stored vectors'.
    pub fn nearest(&self, query: &[f32], n_results: usize) -> Result<Vec<QueryResult>> {
        if let Some(expected) = self.dimensions {
            if expected != query.len() {
                return Err(RagError::DimensionMismatch { expected, actual: query.len() });
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(i, embedding)| (i, self.metric.distance(embedding, query)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(n_results);

        Ok(scored
            .into_iter()
            .map(|(i, distance)| QueryResult {
                id: self.ids[i].clone(),
                text: self.documents[i].clone(),
                metadata: self.metadatas[i].clone(),
                distance,
            })
            .collect())
    }

    /// Check the parallel arrays agree with each other and with the
    /// recorded dimensionality.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let len = self.ids.len();
        if self.embeddings.len() != len || self.documents.len() != len || self.metadatas.len() != len
        {
            return Err(format!(
                "parallel arrays disagree: {} ids, {} embeddings, {} documents, {} metadatas",
                len,
                self.embeddings.len(),
                self.documents.len(),
                self.metadatas.len()
            ));
        }
        if let Some(dimensions) = self.dimensions {
            if let Some(bad) = self.embeddings.iter().find(|e| e.len() != dimensions) {
                return Err(format!(
                    "stored vector has {} dimensions, expected {dimensions}",
                    bad.len()
                ));
            }
        }
        if (self.next_id as usize) < len {
            return Err(format!("next_id {} is behind {} stored entries", self.next_id, len));
        }
        Ok(())
    }
}
