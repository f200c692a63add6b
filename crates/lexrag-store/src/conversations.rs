//! Conversation history persistence.
//!
//! Each session keeps a monotonic sequence counter in its own row.
//! The counter survives message deletion so sequence indices are
//! never reused within a session.

use rusqlite::params;
use tracing::debug;

use crate::sqlite::{now_millis, SqliteStore};
use crate::types::{SessionSummary, StoredMessage};
use lexrag_core::{Error, Result};

/// Placeholder title for sessions with no user message yet.
const EMPTY_SESSION_TITLE: &str = "New chat";

/// Maximum title length before truncation.
const TITLE_MAX_CHARS: usize = 50;

impl SqliteStore {
    /// Append a message to a session, assigning the next sequence index.
    /// Creates the session row on first use. Returns the assigned index.
    pub fn append_message(&self, session_id: &str, role: &str, content: &str) -> Result<i64> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Store(e.to_string()))?;

        tx.execute(
            "INSERT INTO sessions (session_id, next_sequence) VALUES (?1, 0) \
             ON CONFLICT(session_id) DO NOTHING",
            params![session_id],
        )
        .map_err(|e| Error::Store(e.to_string()))?;

        let seq: i64 = tx
            .query_row(
                "SELECT next_sequence FROM sessions WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .map_err(|e| Error::Store(e.to_string()))?;

        tx.execute(
            "INSERT INTO messages (session_id, role, content, sequence_index, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![session_id, role, content, seq, now_millis()],
        )
        .map_err(|e| Error::Store(e.to_string()))?;

        tx.execute(
            "UPDATE sessions SET next_sequence = next_sequence + 1 WHERE session_id = ?1",
            params![session_id],
        )
        .map_err(|e| Error::Store(e.to_string()))?;

        tx.commit().map_err(|e| Error::Store(e.to_string()))?;
        debug!("Appended {} message {} to session {}", role, seq, session_id);
        Ok(seq)
    }

    /// Load a session's messages ordered by sequence index. Unknown
    /// sessions yield an empty history, not an error.
    pub fn load_conversation(&self, session_id: &str) -> Result<Vec<StoredMessage>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT role, content, sequence_index FROM messages \
                 WHERE session_id = ?1 ORDER BY sequence_index ASC",
            )
            .map_err(|e| Error::Store(e.to_string()))?;
        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok(StoredMessage {
                    role: row.get(0)?,
                    content: row.get(1)?,
                    sequence_index: row.get(2)?,
                })
            })
            .map_err(|e| Error::Store(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Delete a session's messages. The session row keeps its sequence
    /// counter, so later appends continue where the history left off.
    /// Returns the number of messages removed.
    pub fn delete_conversation(&self, session_id: &str) -> Result<usize> {
        let conn = self.conn.lock();
        let removed = conn
            .execute(
                "DELETE FROM messages WHERE session_id = ?1",
                params![session_id],
            )
            .map_err(|e| Error::Store(e.to_string()))?;
        debug!("Deleted {} messages from session {}", removed, session_id);
        Ok(removed)
    }

    /// Summaries of all sessions that hold at least one message. The
    /// title is the first user message, truncated; sessions without a
    /// user message get a placeholder.
    pub fn session_summaries(&self) -> Result<Vec<SessionSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT m.session_id, \
                        (SELECT content FROM messages \
                         WHERE session_id = m.session_id AND role = 'user' \
                         ORDER BY sequence_index ASC LIMIT 1) AS first_user \
                 FROM messages m \
                 GROUP BY m.session_id \
                 ORDER BY m.session_id",
            )
            .map_err(|e| Error::Store(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let first_user: Option<String> = row.get(1)?;
                Ok(SessionSummary {
                    id,
                    title: Self::summary_title(first_user.as_deref()),
                })
            })
            .map_err(|e| Error::Store(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    fn summary_title(first_user: Option<&str>) -> String {
        match first_user {
            Some(text) if !text.trim().is_empty() => {
                let trimmed = text.trim();
                if trimmed.chars().count() > TITLE_MAX_CHARS {
                    let head: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
                    format!("{}...", head)
                } else {
                    trimmed.to_string()
                }
            }
            _ => EMPTY_SESSION_TITLE.to_string(),
        }
    }
}
