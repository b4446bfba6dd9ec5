//! Hybrid retriever orchestrating keyword, semantic, fusion, and reranking
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::embedding::{EmbeddingService, HttpEmbedder};
use crate::errors::{Result, RetrievalError};
use crate::reranking::{HttpReranker, RerankingService};
use crate::store::EntityStore;
use crate::types::EntityResult;

use super::fusion;
use super::keyword::KeywordRetriever;
use super::reranker::Reranker;
use super::semantic::SemanticRetriever;
use super::{validate_request, RetrieveOptions, Retriever};

/// Default weight for the keyword list during fusion
const DEFAULT_KEYWORD_WEIGHT: f64 = 0.5;

/// Candidate pool multiplier when no explicit pool size is given
const CANDIDATE_POOL_FACTOR: usize = 5;

/// Hybrid retrieval combining keyword search, semantic search, rank
/// fusion, and optional cross-encoder reranking
///
/// Capabilities are resolved once at construction: without an embedding
/// service the retriever runs keyword-only (a deliberate degraded mode,
/// not an error), and without a reranking service the fused list is
/// simply truncated. A failing sub-retriever fails the whole call; the
/// core never masks partial results.
pub struct HybridRetriever {
    store: Arc<dyn EntityStore>,
    keyword: KeywordRetriever,
    semantic: Option<SemanticRetriever>,
    reranker: Option<Reranker>,
    use_reranking: bool,
    keyword_weight: f64,
}

impl HybridRetriever {
    /// Create a keyword-only hybrid retriever
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            keyword: KeywordRetriever::new(store.clone()),
            store,
            semantic: None,
            reranker: None,
            use_reranking: false,
            keyword_weight: DEFAULT_KEYWORD_WEIGHT,
        }
    }

    /// Enable semantic retrieval with the given embedding service
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingService>) -> Self {
        self.semantic = Some(SemanticRetriever::new(self.store.clone(), embedder));
        self
    }

    /// Enable reranking with the given reranking service, applied by
    /// default on every call unless overridden per call
    pub fn with_reranker(mut self, service: Arc<dyn RerankingService>) -> Self {
        self.reranker = Some(Reranker::new(service));
        self.use_reranking = true;
        self
    }

    /// Change whether reranking applies by default
    pub fn with_reranking_default(mut self, use_reranking: bool) -> Self {
        self.use_reranking = use_reranking;
        self
    }

    /// Change the default keyword weight used during fusion
    pub fn with_keyword_weight(mut self, keyword_weight: f64) -> Self {
        self.keyword_weight = keyword_weight.clamp(0.0, 1.0);
        self
    }

    /// Build a retriever from configuration, wiring HTTP clients for
    /// any configured service endpoints
    pub fn from_config(store: Arc<dyn EntityStore>, config: &Config) -> Result<Self> {
        config.validate()?;

        let mut retriever =
            Self::new(store).with_keyword_weight(config.retrieval.keyword_weight);

        if config.semantic_configured() {
            let mut embedder =
                HttpEmbedder::new(&config.embedding.endpoint_url, config.embedding.dimension)?
                    .with_timeout(Duration::from_secs(config.embedding.timeout_secs))?;
            if config.embedding.best_effort {
                embedder = embedder.with_best_effort();
            }
            retriever = retriever.with_embedder(Arc::new(embedder));
        }

        if config.reranking_configured() {
            let reranker = HttpReranker::new(&config.reranking.endpoint_url)?
                .with_timeout(Duration::from_secs(config.reranking.timeout_secs))?;
            retriever = retriever
                .with_reranker(Arc::new(reranker))
                .with_reranking_default(config.retrieval.use_reranking);
        }

        Ok(retriever)
    }

    /// True when an embedding service is configured
    pub fn semantic_enabled(&self) -> bool {
        self.semantic.is_some()
    }

    /// True when a reranking service is configured
    pub fn reranking_enabled(&self) -> bool {
        self.reranker.is_some()
    }
}

#[async_trait]
impl Retriever for HybridRetriever {
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        options: &RetrieveOptions,
    ) -> Result<Vec<EntityResult>> {
        validate_request(query, top_k)?;

        let keyword_weight = match options.keyword_weight {
            Some(w) if !(0.0..=1.0).contains(&w) => {
                return Err(RetrievalError::InvalidArgument(format!(
                    "keyword_weight must be in [0, 1], got {}",
                    w
                )));
            }
            Some(w) => w,
            None => self.keyword_weight,
        };

        let candidate_pool_size = options
            .candidate_pool_size
            .unwrap_or(top_k * CANDIDATE_POOL_FACTOR);

        // Degraded mode on absence of configuration, never on error
        let Some(semantic) = &self.semantic else {
            info!(query, "no embedding service configured, keyword-only retrieval");
            return self.keyword.retrieve(query, top_k, options).await;
        };

        // The branches are read-only and independent; run them
        // concurrently and require both to complete before fusing.
        let (keyword_results, semantic_results) = tokio::try_join!(
            self.keyword.retrieve(query, candidate_pool_size, options),
            semantic.retrieve(query, candidate_pool_size, options),
        )?;

        debug!(
            query,
            keyword = keyword_results.len(),
            semantic = semantic_results.len(),
            "fusing ranked lists"
        );

        let mut fused = fusion::fuse(keyword_results, semantic_results, keyword_weight);
        fused.truncate(candidate_pool_size);

        let apply_reranking = options.use_reranking.unwrap_or(self.use_reranking);
        match (&self.reranker, apply_reranking) {
            (Some(reranker), true) => reranker.rerank(query, fused, top_k).await,
            _ => {
                fused.truncate(top_k);
                Ok(fused)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingService;
    use crate::reranking::{RerankEntry, RerankingService};
    use crate::store::{InMemoryEntityStore, StoredEntity};
    use serde_json::json;

    struct HashEmbedder;

    /// Deterministic toy embedding: character histogram over a tiny
    /// alphabet, good enough to make similar labels similar.
    #[async_trait]
    impl EmbeddingService for HashEmbedder {
        fn dimension(&self) -> usize {
            26
        }

        async fn embed(&self, text: &str) -> Result<Vec<f64>> {
            let mut v = vec![0.0; 26];
            for c in text.to_lowercase().chars() {
                if c.is_ascii_lowercase() {
                    v[(c as u8 - b'a') as usize] += 1.0;
                }
            }
            Ok(v)
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingService for FailingEmbedder {
        fn dimension(&self) -> usize {
            26
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f64>> {
            Err(RetrievalError::ServiceUnavailable(
                "embedding backend down".to_string(),
            ))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f64>>> {
            Err(RetrievalError::ServiceUnavailable(
                "embedding backend down".to_string(),
            ))
        }
    }

    /// Reverses the candidate order with descending synthetic scores
    struct ReversingRerankService;

    #[async_trait]
    impl RerankingService for ReversingRerankService {
        async fn rerank(
            &self,
            _query: &str,
            documents: &[String],
            top_k: usize,
        ) -> Result<Vec<RerankEntry>> {
            Ok((0..documents.len())
                .rev()
                .take(top_k)
                .enumerate()
                .map(|(pos, index)| RerankEntry {
                    index,
                    score: 1.0 - pos as f64 * 0.01,
                })
                .collect())
        }
    }

    fn outbreak_store() -> Arc<InMemoryEntityStore> {
        let mut store = InMemoryEntityStore::new();
        store.insert(
            StoredEntity::new("d1", "Cholera", "Disease")
                .with_code("A00")
                .with_property("description", json!("Acute diarrhoeal infection")),
        );
        store.insert(
            StoredEntity::new("o1", "Cholera outbreak Yemen 2016", "Outbreak")
                .with_property("description", json!("Large cholera epidemic")),
        );
        store.insert(
            StoredEntity::new("c1", "Yemen", "Country")
                .with_property("description", json!("Country affected by cholera")),
        );
        Arc::new(store)
    }

    fn ids(results: &[EntityResult]) -> Vec<&str> {
        results.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_keyword_only_matches_keyword_retriever_exactly() {
        let store = outbreak_store();
        let hybrid = HybridRetriever::new(store.clone());
        let keyword = KeywordRetriever::new(store);

        let options = RetrieveOptions::default();
        let hybrid_results = hybrid.retrieve("cholera", 10, &options).await.unwrap();
        let keyword_results = keyword.retrieve("cholera", 10, &options).await.unwrap();

        assert!(!hybrid_results.is_empty());
        assert_eq!(ids(&hybrid_results), ids(&keyword_results));
        let scores: Vec<f64> = hybrid_results.iter().map(|r| r.score).collect();
        let expected: Vec<f64> = keyword_results.iter().map(|r| r.score).collect();
        assert_eq!(scores, expected);
    }

    #[tokio::test]
    async fn test_hybrid_fuses_both_branches() {
        let store = outbreak_store();
        let hybrid =
            HybridRetriever::new(store.clone()).with_embedder(Arc::new(HashEmbedder));
        assert!(hybrid.semantic_enabled());
        assert!(!hybrid.reranking_enabled());

        let results = hybrid
            .retrieve("cholera", 3, &RetrieveOptions::default())
            .await
            .unwrap();
        assert!(!results.is_empty());
        assert!(results.len() <= 3);
        // Entity present in both branches at top ranks leads the fusion
        assert_eq!(results[0].id, "d1");
    }

    #[tokio::test]
    async fn test_embedder_failure_fails_whole_call() {
        let store = outbreak_store();
        let hybrid =
            HybridRetriever::new(store.clone()).with_embedder(Arc::new(FailingEmbedder));

        let err = hybrid
            .retrieve("cholera", 5, &RetrieveOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_reranker_applies_by_default_and_can_be_disabled() {
        let store = outbreak_store();
        let hybrid = HybridRetriever::new(store.clone())
            .with_embedder(Arc::new(HashEmbedder))
            .with_reranker(Arc::new(ReversingRerankService));
        assert!(hybrid.reranking_enabled());

        let reranked = hybrid
            .retrieve("cholera", 3, &RetrieveOptions::default())
            .await
            .unwrap();

        let options = RetrieveOptions {
            use_reranking: Some(false),
            ..Default::default()
        };
        let fused_only = hybrid.retrieve("cholera", 3, &options).await.unwrap();

        // The reversing reranker must change the fused order
        let mut reversed = ids(&fused_only);
        reversed.reverse();
        assert_eq!(ids(&reranked), reversed);
    }

    #[tokio::test]
    async fn test_invalid_keyword_weight_rejected() {
        let store = outbreak_store();
        let hybrid =
            HybridRetriever::new(store.clone()).with_embedder(Arc::new(HashEmbedder));

        let options = RetrieveOptions {
            keyword_weight: Some(1.5),
            ..Default::default()
        };
        let err = hybrid.retrieve("cholera", 5, &options).await.unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_any_io() {
        let store = outbreak_store();
        let hybrid =
            HybridRetriever::new(store.clone()).with_embedder(Arc::new(FailingEmbedder));

        // The failing embedder is never reached
        let err = hybrid
            .retrieve("   ", 5, &RetrieveOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_from_config_resolves_capabilities() {
        let store = outbreak_store();

        // No endpoints configured: keyword-only mode
        let bare = HybridRetriever::from_config(store.clone(), &Config::default()).unwrap();
        assert!(!bare.semantic_enabled());
        assert!(!bare.reranking_enabled());

        let mut config = Config::default();
        config.embedding.endpoint_url = "http://localhost:9000".to_string();
        config.reranking.endpoint_url = "http://localhost:9001".to_string();
        let full = HybridRetriever::from_config(store, &config).unwrap();
        assert!(full.semantic_enabled());
        assert!(full.reranking_enabled());
    }

    #[tokio::test]
    async fn test_candidate_pool_bounds_rerank_input() {
        let store = outbreak_store();
        let hybrid = HybridRetriever::new(store.clone())
            .with_embedder(Arc::new(HashEmbedder))
            .with_reranker(Arc::new(ReversingRerankService));

        let options = RetrieveOptions {
            candidate_pool_size: Some(2),
            ..Default::default()
        };
        let results = hybrid.retrieve("cholera", 2, &options).await.unwrap();
        assert!(results.len() <= 2);
    }
}
