//! Error types for the epigraph retrieval core
//!
//! Provides the retrieval error taxonomy with context propagation.
//! Callers should treat any error from `retrieve` as "no results available
//! right now", distinct from a successful empty list.

use thiserror::Error;

/// Main error type for the retrieval pipeline
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Invalid caller input (empty query, non-positive top_k)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Embedding or reranking backend failure
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A collaborator violated its contract (bad indices, size mismatch)
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Timeout errors
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic errors with context
    #[error("Retrieval error: {0}")]
    Generic(String),
}

/// Result type alias for retrieval operations
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Convert anyhow errors to RetrievalError
impl From<anyhow::Error> for RetrievalError {
    fn from(err: anyhow::Error) -> Self {
        RetrievalError::Generic(err.to_string())
    }
}
