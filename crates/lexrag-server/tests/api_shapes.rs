//! API shape tests — validates that response bodies carry the field
//! names and types the frontend client expects.

/// Verify the ask response shape:
/// { sessionId, answer, sources: [{ title, snippet }] }
#[test]
fn test_ask_response_shape() {
    let body = serde_json::json!({
        "sessionId": "3f1f0a52-7f2e-4a5e-9f11-2b6f1a0c9d41",
        "answer": "The lease runs for twelve months.",
        "sources": [
            { "title": "lease.pdf", "snippet": "The term of this lease is twelve months..." },
        ],
    });

    assert!(body["sessionId"].is_string());
    assert!(body["answer"].is_string());
    assert!(body["sources"].is_array());
    assert!(body["sources"][0]["title"].is_string());
    assert!(body["sources"][0]["snippet"].is_string());
}

/// Verify the upload response shape:
/// { message, documentId, chunksIndexed }
#[test]
fn test_upload_response_shape() {
    let body = serde_json::json!({
        "message": "Indexed contract.docx",
        "documentId": 3,
        "chunksIndexed": 12,
    });

    assert!(body["message"].is_string());
    assert!(body["documentId"].is_number());
    assert!(body["chunksIndexed"].is_number());
}

/// An empty extraction still succeeds with zero chunks and no document.
#[test]
fn test_upload_empty_response_shape() {
    let body = serde_json::json!({
        "message": "Indexed blank.txt",
        "documentId": null,
        "chunksIndexed": 0,
    });

    assert_eq!(body["chunksIndexed"], 0);
    assert!(body["documentId"].is_null());
}

/// Verify the sessions list shape: { sessions: [{ id, title }] }
#[test]
fn test_sessions_response_shape() {
    let body = serde_json::json!({
        "sessions": [
            { "id": "abc", "title": "What does the lease say about pets?" },
            { "id": "def", "title": "New chat" },
        ],
    });

    assert!(body["sessions"].is_array());
    assert!(body["sessions"][0]["id"].is_string());
    assert!(body["sessions"][0]["title"].is_string());
}

/// Verify the history shape:
/// { sessionId, history: [{ role, content, sequence_index }] }
#[test]
fn test_history_response_shape() {
    let body = serde_json::json!({
        "sessionId": "abc",
        "history": [
            { "role": "user", "content": "Hello", "sequence_index": 0 },
            { "role": "ai", "content": "Hi", "sequence_index": 1 },
        ],
    });

    assert!(body["history"].is_array());
    assert!(body["history"][0]["role"].is_string());
    assert!(body["history"][0]["sequence_index"].is_number());
}

/// Verify the status shape used by the health indicator.
#[test]
fn test_status_response_shape() {
    let body = serde_json::json!({
        "status": "ok",
        "llmAvailable": true,
        "llmProvider": "anthropic",
        "embeddingsAvailable": false,
        "documents": 4,
        "chunks": 52,
        "embeddings": 0,
        "sessions": 2,
        "embeddingDimension": 1536,
        "dbSizeMb": 0.4,
    });

    assert!(body["status"].is_string());
    assert!(body["llmAvailable"].is_boolean());
    assert!(body["embeddingsAvailable"].is_boolean());
    assert!(body["documents"].is_number());
    assert!(body["chunks"].is_number());
    assert!(body["dbSizeMb"].is_number());
}

/// Verify error bodies: every non-2xx response carries { error }.
#[test]
fn test_error_response_shape() {
    let body = serde_json::json!({ "error": "Question must not be empty" });
    assert!(body["error"].is_string());
}
