//! Data types for indexed documents, retrieved chunks, and conversations.

use serde::{Deserialize, Serialize};

/// A record of one successfully indexed upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: i64,
    pub filename: String,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub chunk_count: i64,
    pub created_at: i64,
}

/// A chunk returned by `search`, ordered by descending relevance.
/// The fusion score is kept for ranking but not exposed on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_id: i64,
    pub doc_id: i64,
    pub content: String,
    pub client_id: String,
    pub original_filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(skip)]
    pub score: f64,
}

/// One message in a session's ordered history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: String,
    pub content: String,
    pub sequence_index: i64,
}

/// A session listing entry with its derived title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
}

/// Store-level statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_documents: i64,
    pub total_chunks: i64,
    pub embeddings_stored: i64,
    pub total_sessions: i64,
    pub embedding_dimension: usize,
    pub db_path: String,
    pub db_size_mb: f64,
}
