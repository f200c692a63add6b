//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default size bound for a single chunk, in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1000;
/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 5;
/// Default embedding dimension (text-embedding-3-small).
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

/// Paths to all LexRAG data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// SQLite index + conversation database directory (`data/index/`).
    pub index: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            index: root.join("index"),
            root,
        };
        std::fs::create_dir_all(&paths.index)?;
        Ok(paths)
    }
}

/// Top-level LexRAG configuration.
///
/// Constructed once at startup and passed by reference into every
/// component that needs it; there are no process-wide singletons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexRagConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Embedding dimension expected by the chunk index.
    pub embedding_dim: usize,
    /// Chunks retrieved per question.
    pub top_k: usize,
    /// Upper bound on chunk length in characters.
    pub max_chunk_size: usize,
    /// Window overlap in characters; 0 selects the sentence-aware chunker.
    pub chunk_overlap: usize,
}

impl LexRagConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let embedding_dim = std::env::var("EMBEDDING_DIM")
            .ok()
            .and_then(|d| d.parse().ok())
            .unwrap_or(DEFAULT_EMBEDDING_DIM);

        let top_k = std::env::var("RETRIEVAL_TOP_K")
            .ok()
            .and_then(|k| k.parse().ok())
            .unwrap_or(DEFAULT_TOP_K);

        let max_chunk_size = std::env::var("MAX_CHUNK_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_CHUNK_SIZE);

        let chunk_overlap = std::env::var("CHUNK_OVERLAP")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            embedding_dim,
            top_k,
            max_chunk_size,
            chunk_overlap,
        })
    }
}
