//! HTTP embedding client
//!
//! Talks to a GPU-backed embedding endpoint: POST {base}/embed with a list
//! of texts, receiving one vector per text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::{Result, RetrievalError};

use super::EmbeddingService;

/// Request timeout for embedding calls (matched to batch size)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    normalize: bool,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f64>>,
}

/// Embedding client against a remote embedding endpoint
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: Client,
    base_url: String,
    dimension: usize,
    /// Return zero vectors instead of failing when the backend errors
    best_effort: bool,
}

impl HttpEmbedder {
    /// Create a new embedder client
    pub fn new(base_url: &str, dimension: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RetrievalError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            dimension,
            best_effort: false,
        })
    }

    /// Fall back to zero vectors on backend failure instead of erroring
    pub fn with_best_effort(mut self) -> Self {
        self.best_effort = true;
        self
    }

    /// Replace the default request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RetrievalError::HttpError)?;
        Ok(self)
    }

    async fn request_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        let url = format!("{}/embed", self.base_url);
        let request = EmbedRequest {
            texts,
            normalize: true,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RetrievalError::ServiceUnavailable(format!("embedding request: {}", e)))?;

        if !response.status().is_success() {
            return Err(RetrievalError::ServiceUnavailable(format!(
                "embedding endpoint returned {}",
                response.status()
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::ServiceUnavailable(format!("embedding response: {}", e)))?;

        if body.embeddings.len() != texts.len() {
            return Err(RetrievalError::ContractViolation(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.embeddings.len()
            )));
        }

        for embedding in &body.embeddings {
            if embedding.len() != self.dimension {
                return Err(RetrievalError::ContractViolation(format!(
                    "expected dimension {}, got {}",
                    self.dimension,
                    embedding.len()
                )));
            }
        }

        debug!(count = texts.len(), "embedded batch");
        Ok(body.embeddings)
    }

    fn zero_vectors(&self, count: usize) -> Vec<Vec<f64>> {
        vec![vec![0.0; self.dimension]; count]
    }
}

#[async_trait]
impl EmbeddingService for HttpEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let texts = vec![text.to_string()];
        let mut embeddings = self.embed_batch(&texts).await?;
        embeddings
            .pop()
            .ok_or_else(|| RetrievalError::ContractViolation("empty embedding batch".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        match self.request_embeddings(texts).await {
            Ok(embeddings) => Ok(embeddings),
            // Contract violations are never masked; only transport-level
            // failures qualify for the best-effort fallback.
            Err(RetrievalError::ServiceUnavailable(msg)) if self.best_effort => {
                warn!(error = %msg, "embedding backend failed, returning zero vectors");
                Ok(self.zero_vectors(texts.len()))
            }
            Err(e) => Err(e),
        }
    }
}
