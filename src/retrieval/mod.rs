//! Multi-strategy retrieval and ranking pipeline
//!
//! Components:
//! - Keyword retriever: lexical search over the graph store
//! - Semantic retriever: cosine similarity over text embeddings
//! - Rank fusion: Reciprocal Rank Fusion of both ranked lists
//! - Reranker adapter: cross-encoder second pass over a capped pool
//! - Hybrid retriever: orchestrates all of the above behind one contract

pub mod fusion;
pub mod hybrid;
pub mod keyword;
pub mod reranker;
pub mod semantic;

use async_trait::async_trait;

use crate::errors::{Result, RetrievalError};
use crate::types::{EntityResult, SearchFilters};

pub use hybrid::HybridRetriever;
pub use keyword::KeywordRetriever;
pub use reranker::Reranker;
pub use semantic::SemanticRetriever;

/// Per-call options recognized by `Retriever::retrieve`
///
/// Unset fields fall back to the retriever's constructor-time defaults.
#[derive(Debug, Clone, Default)]
pub struct RetrieveOptions {
    /// Entity filters applied by the lexical search
    pub filters: Option<SearchFilters>,
    /// Override the default reranking behavior
    pub use_reranking: Option<bool>,
    /// Weight for the keyword list during fusion, in [0, 1]
    pub keyword_weight: Option<f64>,
    /// Bound on the intermediate candidate pool (default top_k * 5)
    pub candidate_pool_size: Option<usize>,
}

/// The sole public contract of the retrieval core
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve a ranked list of entities matching the query
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        options: &RetrieveOptions,
    ) -> Result<Vec<EntityResult>>;
}

/// Validate the query and top_k shared by every retriever
pub(crate) fn validate_request(query: &str, top_k: usize) -> Result<()> {
    if query.trim().is_empty() {
        return Err(RetrievalError::InvalidArgument(
            "query cannot be empty".to_string(),
        ));
    }
    if top_k == 0 {
        return Err(RetrievalError::InvalidArgument(
            "top_k must be greater than 0".to_string(),
        ));
    }
    Ok(())
}
