//! Text embedding service abstraction
//!
//! The semantic retriever consumes an `EmbeddingService`; the concrete
//! backend (GPU endpoint, local model) is wired in at construction time.

pub mod client;

use async_trait::async_trait;

use crate::errors::Result;

pub use client::HttpEmbedder;

/// Turns text into fixed-dimension vectors, single or batched
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embedding dimension of the backing model
    fn dimension(&self) -> usize;

    /// Embed a single text string
    async fn embed(&self, text: &str) -> Result<Vec<f64>>;

    /// Embed a batch of texts; the output length must match the input
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>>;
}

/// Cosine similarity between two vectors
///
/// Returns 0.0 for zero-norm vectors rather than dividing by zero.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_vectors() {
        let v = vec![0.5, 0.5, 0.7];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_opposite_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_zero_norm_guard() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 2.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&b, &a), 0.0);
    }
}
