//! HTTP reranking client
//!
//! Talks to a GPU-backed cross-encoder endpoint: POST {base}/rerank with
//! the query and documents, receiving scored indices.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::errors::{Result, RetrievalError};

use super::{RerankEntry, RerankingService};

/// Request timeout for reranking calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    documents: &'a [String],
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    results: Vec<RerankResponseEntry>,
}

#[derive(Debug, Deserialize)]
struct RerankResponseEntry {
    index: usize,
    score: f64,
}

/// Reranking client against a remote cross-encoder endpoint
#[derive(Debug, Clone)]
pub struct HttpReranker {
    client: Client,
    base_url: String,
}

impl HttpReranker {
    /// Create a new reranker client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RetrievalError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Replace the default request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RetrievalError::HttpError)?;
        Ok(self)
    }
}

#[async_trait]
impl RerankingService for HttpReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_k: usize,
    ) -> Result<Vec<RerankEntry>> {
        let url = format!("{}/rerank", self.base_url);
        let request = RerankRequest {
            query,
            documents,
            top_k,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RetrievalError::ServiceUnavailable(format!("rerank request: {}", e)))?;

        if !response.status().is_success() {
            return Err(RetrievalError::ServiceUnavailable(format!(
                "rerank endpoint returned {}",
                response.status()
            )));
        }

        let body: RerankResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::ServiceUnavailable(format!("rerank response: {}", e)))?;

        debug!(
            documents = documents.len(),
            returned = body.results.len(),
            "reranked candidate documents"
        );

        Ok(body
            .results
            .into_iter()
            .map(|r| RerankEntry {
                index: r.index,
                score: r.score,
            })
            .collect())
    }
}
