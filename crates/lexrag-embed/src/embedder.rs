//! Embedding backend trait.
//!
//! Implementations:
//! - `RemoteEmbedder`: OpenAI-compatible embeddings API over HTTP
//! - `NoopEmbedder`: returns None to signal no embeddings available
//!   (search degrades to BM25-only)

use ndarray::Array1;

/// Trait for embedding backends.
///
/// Methods are blocking; callers on an async runtime must dispatch
/// through `spawn_blocking`.
pub trait EmbedderBackend: Send + Sync {
    /// Generate an embedding for a text string.
    /// Returns None if the embedder is not available or the call failed.
    fn embed(&self, text: &str) -> Option<Array1<f32>>;

    /// Generate embeddings for a batch of texts.
    fn embed_batch(&self, texts: &[&str]) -> Vec<Option<Array1<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;

    /// Check if the embedder can serve requests.
    fn is_available(&self) -> bool;
}

/// Placeholder embedder that always returns None (BM25-only mode).
pub struct NoopEmbedder {
    dim: usize,
}

impl NoopEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl EmbedderBackend for NoopEmbedder {
    fn embed(&self, _text: &str) -> Option<Array1<f32>> {
        None
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_embedder_unavailable() {
        let embedder = NoopEmbedder::new(1536);
        assert!(!embedder.is_available());
        assert!(embedder.embed("any text").is_none());
        assert_eq!(embedder.dimension(), 1536);
    }

    #[test]
    fn test_noop_batch_all_none() {
        let embedder = NoopEmbedder::new(8);
        let results = embedder.embed_batch(&["a", "b", "c"]);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_none()));
    }
}
