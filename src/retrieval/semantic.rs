//! Semantic retriever over dense text embeddings
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::embedding::{cosine_similarity, EmbeddingService};
use crate::errors::{Result, RetrievalError};
use crate::store::EntityStore;
use crate::types::{rank_ordering, EntityResult};

use super::{validate_request, RetrieveOptions, Retriever};

/// Default bound on candidates pulled for embedding
const DEFAULT_CANDIDATE_POOL_SIZE: usize = 100;

/// Vector-based semantic search retriever
///
/// The lexical pre-filter exists purely to bound the number of embedding
/// calls, not for relevance; similarity against the query embedding is
/// the only ranking signal.
pub struct SemanticRetriever {
    store: Arc<dyn EntityStore>,
    embedder: Arc<dyn EmbeddingService>,
    candidate_pool_size: usize,
}

impl SemanticRetriever {
    /// Create a new semantic retriever with the default candidate pool
    pub fn new(store: Arc<dyn EntityStore>, embedder: Arc<dyn EmbeddingService>) -> Self {
        Self {
            store,
            embedder,
            candidate_pool_size: DEFAULT_CANDIDATE_POOL_SIZE,
        }
    }

    /// Override the candidate pool bound
    pub fn with_candidate_pool_size(mut self, candidate_pool_size: usize) -> Self {
        self.candidate_pool_size = candidate_pool_size;
        self
    }
}

#[async_trait]
impl Retriever for SemanticRetriever {
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        options: &RetrieveOptions,
    ) -> Result<Vec<EntityResult>> {
        validate_request(query, top_k)?;

        let pool_size = options
            .candidate_pool_size
            .unwrap_or(self.candidate_pool_size);

        let query_embedding = self.embedder.embed(query).await?;

        // Keyword pre-filter bounds the embedding cost
        let candidates = self
            .store
            .search(query, pool_size, options.filters.as_ref())
            .await?;

        if candidates.is_empty() {
            debug!(query, "no candidates for semantic retrieval");
            return Ok(Vec::new());
        }

        let labels: Vec<String> = candidates.iter().map(|c| c.label.clone()).collect();
        let candidate_embeddings = self.embedder.embed_batch(&labels).await?;

        if candidate_embeddings.len() != candidates.len() {
            return Err(RetrievalError::ContractViolation(format!(
                "embedding batch returned {} vectors for {} candidates",
                candidate_embeddings.len(),
                candidates.len()
            )));
        }

        let mut results: Vec<EntityResult> = candidates
            .into_iter()
            .zip(candidate_embeddings.iter())
            .map(|(mut entity, embedding)| {
                // Negative similarity is not a useful relevance signal here
                let similarity = cosine_similarity(&query_embedding, embedding).max(0.0);
                entity.score = similarity;
                entity.ensure_snippet();
                entity
            })
            .collect();

        results.sort_by(rank_ordering);
        results.truncate(top_k);

        debug!(query, count = results.len(), "semantic retrieval complete");
        Ok(results)
    }
}
