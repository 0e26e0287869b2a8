//! Ollama embedding provider using the `/api/embed` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::document::Embedding;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The default Ollama server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// The default embedding model.
pub const DEFAULT_MODEL: &str = "mistral";

const PROVIDER: &str = "Ollama";

/// Connection settings for an Ollama server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base address of the server, e.g. `http://localhost:11434`.
    pub base_url: String,
    /// Model used to compute embeddings.
    pub model: String,
    /// Per-request timeout. `None` waits indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), model: DEFAULT_MODEL.to_string(), timeout: None }
    }
}

/// An [`EmbeddingProvider`] backed by an Ollama server.
///
/// Each [`embed_batch`](EmbeddingProvider::embed_batch) call is one
/// `POST {base_url}/api/embed` request carrying all texts of the batch.
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rag::{OllamaConfig, OllamaEmbeddingProvider};
///
/// let provider = OllamaEmbeddingProvider::new(OllamaConfig::default())?;
/// let vectors = provider.embed_batch(&["hello world"]).await?;
/// ```
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaEmbeddingProvider {
    /// Create a provider for the given server settings.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the model is empty or the HTTP
    /// client cannot be built.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(RagError::ConfigError("embedding model must not be empty".into()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RagError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: embed_endpoint(&config.base_url),
            model: config.model,
        })
    }

    /// The model name sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The full URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn embed_endpoint(base_url: &str) -> String {
    format!("{}/api/embed", base_url.trim_end_matches('/'))
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Embedding>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

fn provider_error(message: String) -> RagError {
    RagError::EmbeddingError { provider: PROVIDER.into(), message }
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = PROVIDER, batch_size = texts.len(), model = %self.model, "embedding batch");

        let request_body = EmbedRequest { model: &self.model, input: texts };

        let response =
            self.client.post(&self.endpoint).json(&request_body).send().await.map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                provider_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(provider_error(format!("API returned {status}: {detail}")));
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            provider_error(format!("failed to parse response: {e}"))
        })?;

        Ok(embed_response.embeddings)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_endpoint_from_base_url() {
        assert_eq!(embed_endpoint("http://localhost:11434"), "http://localhost:11434/api/embed");
        assert_eq!(embed_endpoint("http://gpu-box:11434/"), "http://gpu-box:11434/api/embed");
    }

    #[test]
    fn rejects_empty_model() {
        let config = OllamaConfig { model: "  ".into(), ..OllamaConfig::default() };
        assert!(matches!(OllamaEmbeddingProvider::new(config), Err(RagError::ConfigError(_))));
    }

    #[test]
    fn request_and_response_shapes() {
        let body = serde_json::to_value(EmbedRequest { model: "mistral", input: &["a", "b"] }).unwrap();
        assert_eq!(body, serde_json::json!({ "model": "mistral", "input": ["a", "b"] }));

        let response: EmbedResponse =
            serde_json::from_str(r#"{"model":"mistral","embeddings":[[0.1,0.2],[0.3,0.4]]}"#)
                .unwrap();
        assert_eq!(response.embeddings.len(), 2);
        assert_eq!(response.embeddings[1], vec![0.3, 0.4]);
    }

    #[tokio::test]
    async fn unreachable_server_is_an_embedding_error() {
        let provider = OllamaEmbeddingProvider::new(OllamaConfig {
            base_url: "http://127.0.0.1:1".into(),
            timeout: Some(Duration::from_secs(5)),
            ..OllamaConfig::default()
        })
        .unwrap();

        let err = provider.embed_batch(&["hello"]).await.unwrap_err();

        assert!(matches!(err, RagError::EmbeddingError { .. }));
    }
}
