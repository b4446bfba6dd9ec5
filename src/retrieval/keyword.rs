//! Keyword retriever wrapping the store's lexical search
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::errors::Result;
use crate::store::{EntityStore, LEXICAL_SCORE_CEILING};
use crate::types::{clamp_score, rank_ordering, EntityResult};

use super::{validate_request, RetrieveOptions, Retriever};

/// Full-text keyword search retriever
///
/// Delegates scoring to the store's field-priority weighting and
/// normalizes raw scores into [0, 1] by the fixed scoring ceiling.
/// Normalizing per-call by the observed maximum would make scores
/// incomparable across calls and break fusion determinism.
pub struct KeywordRetriever {
    store: Arc<dyn EntityStore>,
}

impl KeywordRetriever {
    /// Create a new keyword retriever
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Retriever for KeywordRetriever {
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        options: &RetrieveOptions,
    ) -> Result<Vec<EntityResult>> {
        validate_request(query, top_k)?;

        let mut results = self
            .store
            .search(query, top_k, options.filters.as_ref())
            .await?;

        for result in &mut results {
            result.score = clamp_score(result.score / LEXICAL_SCORE_CEILING);
            result.ensure_snippet();
        }
        results.sort_by(rank_ordering);

        debug!(query, count = results.len(), "keyword retrieval complete");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryEntityStore, StoredEntity};
    use serde_json::json;

    fn sample_retriever() -> KeywordRetriever {
        let mut store = InMemoryEntityStore::new();
        store.insert(
            StoredEntity::new("d1", "Malaria", "Disease")
                .with_code("B54")
                .with_property("description", json!("Mosquito-borne infectious disease")),
        );
        store.insert(
            StoredEntity::new("d2", "Measles", "Disease")
                .with_property("description", json!("Highly contagious viral disease")),
        );
        store.insert(StoredEntity::new("c1", "Madagascar", "Country"));
        KeywordRetriever::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_retrieve_rejects_empty_query() {
        let retriever = sample_retriever();
        let result = retriever
            .retrieve("  ", 10, &RetrieveOptions::default())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_scores_normalized_into_unit_range() {
        let retriever = sample_retriever();
        let results = retriever
            .retrieve("malaria disease", 10, &RetrieveOptions::default())
            .await
            .unwrap();
        assert!(!results.is_empty());
        for result in &results {
            assert!(result.score > 0.0 && result.score <= 1.0);
        }
    }

    #[tokio::test]
    async fn test_no_nonpositive_scores_returned() {
        let retriever = sample_retriever();
        let results = retriever
            .retrieve("zzz-no-match", 10, &RetrieveOptions::default())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_ties_broken_by_label() {
        let mut store = InMemoryEntityStore::new();
        // Identical scoring profile, only the label differs.
        store.insert(StoredEntity::new("b", "Borrelia", "Pathogen"));
        store.insert(StoredEntity::new("a", "Anthrax", "Pathogen"));
        let retriever = KeywordRetriever::new(Arc::new(store));

        let results = retriever
            .retrieve("pathogen", 10, &RetrieveOptions::default())
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].label, "Anthrax");
        assert_eq!(results[1].label, "Borrelia");
    }

    #[tokio::test]
    async fn test_snippet_filled_from_properties() {
        let retriever = sample_retriever();
        let results = retriever
            .retrieve("measles", 10, &RetrieveOptions::default())
            .await
            .unwrap();
        assert_eq!(results[0].snippet, "Highly contagious viral disease");
    }
}
