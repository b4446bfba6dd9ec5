//! Cross-encoder reranker adapter
//!
//! Bridges the ranked candidate pool to a `RerankingService`: builds one
//! document per candidate, maps the returned indices back, and replaces
//! scores with the reranker's query-conditioned relevance.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::errors::{Result, RetrievalError};
use crate::reranking::RerankingService;
use crate::types::EntityResult;

/// Adapter around a reranking backend
pub struct Reranker {
    service: Arc<dyn RerankingService>,
}

impl Reranker {
    /// Create a new reranker adapter
    pub fn new(service: Arc<dyn RerankingService>) -> Self {
        Self { service }
    }

    /// Build the document string submitted for one candidate
    fn document_text(entity: &EntityResult) -> String {
        if entity.snippet.is_empty() {
            entity.label.clone()
        } else {
            format!("{}. {}", entity.label, entity.snippet)
        }
    }

    /// Rerank candidates by query-conditioned relevance
    ///
    /// The service's ordering is authoritative and is not re-sorted; its
    /// score overwrites the fusion score as the final relevance signal.
    /// Out-of-range or duplicate indices from the service are contract
    /// violations, never silently truncated.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: Vec<EntityResult>,
        top_k: usize,
    ) -> Result<Vec<EntityResult>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let documents: Vec<String> = candidates.iter().map(Self::document_text).collect();

        let entries = self.service.rerank(query, &documents, top_k).await?;

        let mut seen: HashSet<usize> = HashSet::new();
        let mut reranked = Vec::with_capacity(entries.len().min(top_k));

        for entry in entries.iter().take(top_k) {
            if entry.index >= candidates.len() {
                return Err(RetrievalError::ContractViolation(format!(
                    "rerank index {} out of range for {} candidates",
                    entry.index,
                    candidates.len()
                )));
            }
            if !seen.insert(entry.index) {
                return Err(RetrievalError::ContractViolation(format!(
                    "duplicate rerank index {}",
                    entry.index
                )));
            }

            let mut entity = candidates[entry.index].clone();
            entity.score = entry.score;
            reranked.push(entity);
        }

        debug!(
            query,
            candidates = candidates.len(),
            returned = reranked.len(),
            "reranking complete"
        );
        Ok(reranked)
    }
}
