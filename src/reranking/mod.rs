//! Cross-encoder reranking service abstraction
//!
//! A reranking backend scores (query, document) pairs jointly and returns
//! `(index, score)` pairs into the submitted document list, ordered by
//! descending relevance.

pub mod client;

use async_trait::async_trait;

use crate::errors::Result;

pub use client::HttpReranker;

/// A single reranking judgment: index into the submitted documents
/// plus the cross-encoder relevance score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RerankEntry {
    pub index: usize,
    pub score: f64,
}

/// Scores a document set against a query with a cross-encoder model
#[async_trait]
pub trait RerankingService: Send + Sync {
    /// Rerank documents by relevance to the query, returning at most
    /// `top_k` entries in descending-relevance order
    async fn rerank(&self, query: &str, documents: &[String], top_k: usize)
        -> Result<Vec<RerankEntry>>;
}
