//! Error types for LexRAG.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Chunking error: {0}")]
    Chunking(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Duplicate content: hash={0}")]
    DuplicateContent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
