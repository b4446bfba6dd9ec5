//! Configuration for the retrieval pipeline
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.epigraph/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::{Result, RetrievalError};

/// Complete configuration for the retrieval core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub reranking: RerankingConfig,
}

/// Ranking pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Default number of results per query
    pub default_top_k: usize,
    /// Weight for keyword scores during fusion (0-1)
    pub keyword_weight: f64,
    /// Apply cross-encoder reranking by default
    pub use_reranking: bool,
    /// Candidate pool bound for the semantic pre-filter
    pub candidate_pool_size: usize,
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding endpoint base URL; empty disables semantic retrieval
    pub endpoint_url: String,
    pub dimension: usize,
    pub timeout_secs: u64,
    /// Zero-vector fallback instead of failing on backend errors
    pub best_effort: bool,
}

/// Reranking service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankingConfig {
    /// Reranking endpoint base URL; empty disables reranking
    pub endpoint_url: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retrieval: RetrievalConfig::default(),
            embedding: EmbeddingConfig::default(),
            reranking: RerankingConfig::default(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_top_k: 10,
            keyword_weight: 0.5,
            use_reranking: true,
            candidate_pool_size: 100,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            dimension: 1536,
            timeout_secs: 30,
            best_effort: false,
        }
    }
}

impl Default for RerankingConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RetrievalError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| RetrievalError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".epigraph").join("config.toml");
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.default_top_k == 0 {
            return Err(RetrievalError::ConfigError(
                "default_top_k must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.retrieval.keyword_weight) {
            return Err(RetrievalError::ConfigError(
                "keyword_weight must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.retrieval.candidate_pool_size == 0 {
            return Err(RetrievalError::ConfigError(
                "candidate_pool_size must be greater than 0".to_string(),
            ));
        }

        if !self.embedding.endpoint_url.is_empty() && self.embedding.dimension == 0 {
            return Err(RetrievalError::ConfigError(
                "embedding dimension must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| RetrievalError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RetrievalError::ConfigError(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| RetrievalError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// True when an embedding endpoint is configured
    pub fn semantic_configured(&self) -> bool {
        !self.embedding.endpoint_url.is_empty()
    }

    /// True when a reranking endpoint is configured
    pub fn reranking_configured(&self) -> bool {
        !self.reranking.endpoint_url.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.retrieval.default_top_k, 10);
        assert_eq!(config.retrieval.keyword_weight, 0.5);
        assert!(config.retrieval.use_reranking);
        assert!(!config.semantic_configured());
        assert!(!config.reranking_configured());
    }

    #[test]
    fn test_config_validation_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_top_k() {
        let mut config = Config::default();
        config.retrieval.default_top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_keyword_weight_range() {
        let mut config = Config::default();
        config.retrieval.keyword_weight = 1.5;
        assert!(config.validate().is_err());
        config.retrieval.keyword_weight = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_pool() {
        let mut config = Config::default();
        config.retrieval.candidate_pool_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.embedding.endpoint_url = "http://localhost:9000".to_string();
        config.retrieval.keyword_weight = 0.7;
        config.save(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.embedding.endpoint_url, "http://localhost:9000");
        assert_eq!(loaded.retrieval.keyword_weight, 0.7);
        assert!(loaded.semantic_configured());
    }
}
