//! Embedding providers and the batching client that drives them.
//!
//! [`EmbeddingProvider`] is the seam to an external embedding service.
//! [`BatchEmbedder`] splits input into bounded batches, paces calls, and
//! degrades a failed batch into single-text calls so that one bad text does
//! not sink its neighbours.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::config::RagConfig;
use crate::document::Embedding;
use crate::error::{RagError, Result};

/// A provider that generates vector embeddings from text input.
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rag::EmbeddingProvider;
///
/// let provider = MyEmbeddingProvider::new();
/// let vectors = provider.embed_batch(&["hello", "world"]).await?;
/// assert_eq!(vectors.len(), 2);
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate one embedding per input text, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.embed_batch(&[text]).await?.into_iter().next().ok_or_else(|| {
            RagError::EmbeddingError {
                provider: self.name().to_string(),
                message: "provider returned no embedding".to_string(),
            }
        })
    }

    /// Short name used in logs and errors.
    fn name(&self) -> &str {
        "embedding"
    }
}

/// The result of embedding one input text.
#[derive(Debug)]
pub enum ItemOutcome {
    /// The text was embedded.
    Embedded(Embedding),
    /// The text failed both in its batch and on its own, and was dropped.
    Failed(RagError),
}

impl ItemOutcome {
    /// The embedding, if this text succeeded.
    pub fn embedding(&self) -> Option<&Embedding> {
        match self {
            Self::Embedded(embedding) => Some(embedding),
            Self::Failed(_) => None,
        }
    }
}

/// Per-text outcomes of one [`BatchEmbedder::embed`] call, in input order.
#[derive(Debug)]
pub struct EmbeddingRun {
    outcomes: Vec<ItemOutcome>,
    dimensions: usize,
}

impl EmbeddingRun {
    /// Outcomes aligned with the input texts.
    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    /// Dimensionality shared by every produced embedding (zero for an empty run).
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of input texts.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the run covered no texts.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of texts that were embedded.
    pub fn embedded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.embedding().is_some()).count()
    }

    /// Input positions of the texts that were dropped.
    pub fn failed_indices(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.embedding().is_none().then_some(i))
            .collect()
    }

    /// The successful embeddings, in input order.
    pub fn into_embeddings(self) -> Vec<Embedding> {
        self.outcomes
            .into_iter()
            .filter_map(|o| match o {
                ItemOutcome::Embedded(embedding) => Some(embedding),
                ItemOutcome::Failed(_) => None,
            })
            .collect()
    }

    /// Pair `items` (one per input text, same order) with their embeddings,
    /// dropping items whose text failed.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::LengthMismatch`] if `items` does not have one
    /// entry per input text.
    pub fn align<T>(self, items: Vec<T>) -> Result<Vec<(T, Embedding)>> {
        if items.len() != self.outcomes.len() {
            return Err(RagError::LengthMismatch {
                chunks: items.len(),
                embeddings: self.outcomes.len(),
            });
        }
        Ok(items
            .into_iter()
            .zip(self.outcomes)
            .filter_map(|(item, outcome)| match outcome {
                ItemOutcome::Embedded(embedding) => Some((item, embedding)),
                ItemOutcome::Failed(_) => None,
            })
            .collect())
    }
}

/// Embeds texts in bounded batches with pacing and per-text fallback.
///
/// Each batch is one provider call. When a batch fails, each of its texts is
/// retried alone; a text that fails again is logged and dropped. A fixed
/// delay follows every successful call. Calls are strictly sequential.
///
/// # Example
///
/// ```rust,ignore
/// let embedder = BatchEmbedder::new(provider, 8).with_pacing(Duration::from_millis(500));
/// let run = embedder.embed(&texts).await?;
/// let pairs = run.align(chunks)?;
/// ```
#[derive(Clone)]
pub struct BatchEmbedder {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    pacing: Duration,
}

impl BatchEmbedder {
    /// Create a client sending at most `batch_size` texts per call, without pacing.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, batch_size: usize) -> Self {
        Self { provider, batch_size: batch_size.max(1), pacing: Duration::ZERO }
    }

    /// Create a client using the batch size and pacing from `config`.
    pub fn from_config(provider: Arc<dyn EmbeddingProvider>, config: &RagConfig) -> Self {
        Self::new(provider, config.batch_size).with_pacing(config.pacing)
    }

    /// Set the delay inserted after every successful call.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// The underlying provider.
    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Embed `texts`, returning one outcome per text in input order.
    ///
    /// # Errors
    ///
    /// - [`RagError::ProviderUnavailable`] if the input was non-empty and no
    ///   text was embedded.
    /// - [`RagError::DimensionMismatch`] if the provider returns vectors of
    ///   differing lengths within the run.
    pub async fn embed(&self, texts: &[&str]) -> Result<EmbeddingRun> {
        let mut run = EmbeddingRun { outcomes: Vec::with_capacity(texts.len()), dimensions: 0 };
        if texts.is_empty() {
            return Ok(run);
        }

        let batch_count = texts.len().div_ceil(self.batch_size);
        let mut dimensions = None;

        for (index, batch) in texts.chunks(self.batch_size).enumerate() {
            let batch_number = index + 1;
            info!(batch = batch_number, batch_count, size = batch.len(), "processing batch");

            match self.call(batch).await {
                Ok(vectors) => {
                    for vector in &vectors {
                        check_dimensions(&mut dimensions, vector)?;
                    }
                    run.outcomes.extend(vectors.into_iter().map(ItemOutcome::Embedded));
                    debug!(batch = batch_number, "batch succeeded");
                    self.pace().await;
                }
                Err(e) => {
                    let failure =
                        RagError::BatchEmbedFailure { batch: batch_number, message: e.to_string() };
                    warn!(error = %failure, "retrying batch one text at a time");

                    for (offset, text) in batch.iter().enumerate() {
                        let position = index * self.batch_size + offset;
                        match self.call_one(text).await {
                            Ok(vector) => {
                                check_dimensions(&mut dimensions, &vector)?;
                                run.outcomes.push(ItemOutcome::Embedded(vector));
                                self.pace().await;
                            }
                            Err(e) => {
                                error!(
                                    batch = batch_number,
                                    position,
                                    error = %e,
                                    "text failed twice, skipping"
                                );
                                run.outcomes.push(ItemOutcome::Failed(e));
                            }
                        }
                    }
                }
            }
        }

        let embedded = run.embedded_count();
        if embedded == 0 {
            error!(attempted = texts.len(), "no embeddings were generated");
            return Err(RagError::ProviderUnavailable { attempted: texts.len() });
        }

        run.dimensions = dimensions.unwrap_or_default();
        info!(embedded, dropped = texts.len() - embedded, dimensions = run.dimensions, "embedding complete");
        Ok(run)
    }

    /// Embed a single query text with the same retry policy.
    pub async fn embed_query(&self, text: &str) -> Result<Embedding> {
        let run = self.embed(&[text]).await?;
        run.into_embeddings()
            .into_iter()
            .next()
            .ok_or(RagError::ProviderUnavailable { attempted: 1 })
    }

    /// A single-text call yielding exactly one vector.
    async fn call_one(&self, text: &str) -> Result<Embedding> {
        self.call(&[text]).await?.into_iter().next().ok_or_else(|| RagError::EmbeddingError {
            provider: self.provider.name().to_string(),
            message: "returned no embedding".to_string(),
        })
    }

    /// One provider call, rejecting responses that do not line up with the input.
    async fn call(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let vectors = self.provider.embed_batch(texts).await?;
        if vectors.len() != texts.len() {
            return Err(RagError::EmbeddingError {
                provider: self.provider.name().to_string(),
                message: format!("returned {} embeddings for {} texts", vectors.len(), texts.len()),
            });
        }
        if vectors.iter().any(Vec::is_empty) {
            return Err(RagError::EmbeddingError {
                provider: self.provider.name().to_string(),
                message: "returned an empty embedding".to_string(),
            });
        }
        Ok(vectors)
    }

    async fn pace(&self) {
        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }
    }
}

fn check_dimensions(established: &mut Option<usize>, vector: &[f32]) -> Result<()> {
    match *established {
        None => {
            *established = Some(vector.len());
            Ok(())
        }
        Some(expected) if expected == vector.len() => Ok(()),
        Some(expected) => {
            error!(expected, actual = vector.len(), "embedding dimension mismatch");
            Err(RagError::DimensionMismatch { expected, actual: vector.len() })
        }
    }
}
