//! Persistent storage for the retrieval index and conversation history.
//!
//! A single SQLite database holds documents, chunks, quantized chunk
//! embeddings, and per-session message history. Full-text search runs
//! through an FTS5 shadow table kept in sync by triggers; vector search
//! runs over an in-memory matrix rebuilt lazily after writes.

pub mod conversations;
pub mod embedding;
pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::{content_hash, SqliteStore};
pub use types::{
    DocumentRecord, RetrievedChunk, SessionSummary, StoreStats, StoredMessage,
};
