//! LexRAG Embed — embedding backends for hybrid retrieval.
//!
//! Provides the `EmbedderBackend` trait. With an embeddings API key
//! configured, `RemoteEmbedder` generates vectors over HTTP; without
//! one, `NoopEmbedder` is used and search falls back to BM25-only.

pub mod embedder;
pub mod remote;

pub use embedder::{EmbedderBackend, NoopEmbedder};
pub use remote::RemoteEmbedder;

use std::sync::Arc;

/// Create the best available embedder for the given dimension.
///
/// Tries the remote API first (if a key is configured), falls back
/// to NoopEmbedder.
pub fn create_embedder(dim: usize) -> Arc<dyn EmbedderBackend> {
    match RemoteEmbedder::from_env(dim) {
        Some(embedder) => {
            tracing::info!("Using remote embedder (dim={})", dim);
            Arc::new(embedder)
        }
        None => {
            tracing::info!("No embeddings API key configured. Using BM25-only search.");
            Arc::new(NoopEmbedder::new(dim))
        }
    }
}
