//! Chunk tagging — attaches tenant identity and provenance metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata keys the pipeline owns. Caller-supplied values under these
/// names are discarded so tenant identity and provenance cannot be
/// spoofed through upload metadata.
pub const RESERVED_KEYS: [&str; 3] = ["original_filename", "ingestion_timestamp", "client_id"];

/// Metadata attached to every chunk.
///
/// Tenant and provenance fields are plain struct fields; arbitrary
/// caller-supplied keys ride along in `extra` and flatten into the
/// same JSON object on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub original_filename: String,
    /// RFC 3339 timestamp of the ingestion call.
    pub ingestion_timestamp: String,
    pub client_id: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A chunk of document text ready for indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedChunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// Tag each chunk string with merged metadata, preserving chunk order.
///
/// Pure function: every chunk from one call carries the same timestamp.
pub fn tag(
    chunks: Vec<String>,
    base_metadata: &BTreeMap<String, serde_json::Value>,
    client_id: &str,
    filename: &str,
) -> Vec<TaggedChunk> {
    let timestamp = chrono::Utc::now().to_rfc3339();

    let mut extra = base_metadata.clone();
    for key in RESERVED_KEYS {
        extra.remove(key);
    }

    chunks
        .into_iter()
        .map(|content| TaggedChunk {
            content,
            metadata: ChunkMetadata {
                original_filename: filename.to_string(),
                ingestion_timestamp: timestamp.clone(),
                client_id: client_id.to_string(),
                extra: extra.clone(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(pairs: &[(&str, serde_json::Value)]) -> BTreeMap<String, serde_json::Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_provenance_fields_populated() {
        let tagged = tag(
            vec!["Section 1.".to_string(), "Section 2.".to_string()],
            &BTreeMap::new(),
            "tenant-a",
            "charter.txt",
        );
        assert_eq!(tagged.len(), 2);
        for chunk in &tagged {
            assert_eq!(chunk.metadata.original_filename, "charter.txt");
            assert_eq!(chunk.metadata.client_id, "tenant-a");
            assert!(!chunk.metadata.ingestion_timestamp.is_empty());
        }
        // One call, one timestamp.
        assert_eq!(
            tagged[0].metadata.ingestion_timestamp,
            tagged[1].metadata.ingestion_timestamp
        );
    }

    #[test]
    fn test_caller_metadata_carried_through() {
        let base = meta(&[("document_type", json!("statute")), ("jurisdiction", json!("KZ"))]);
        let tagged = tag(vec!["Text.".to_string()], &base, "tenant-a", "act.txt");
        assert_eq!(tagged[0].metadata.extra["document_type"], json!("statute"));
        assert_eq!(tagged[0].metadata.extra["jurisdiction"], json!("KZ"));
    }

    #[test]
    fn test_caller_cannot_spoof_tenant_or_provenance() {
        let base = meta(&[
            ("client_id", json!("tenant-evil")),
            ("original_filename", json!("forged.txt")),
            ("ingestion_timestamp", json!("1970-01-01T00:00:00Z")),
        ]);
        let tagged = tag(vec!["Text.".to_string()], &base, "tenant-a", "real.txt");
        let md = &tagged[0].metadata;
        assert_eq!(md.client_id, "tenant-a");
        assert_eq!(md.original_filename, "real.txt");
        assert_ne!(md.ingestion_timestamp, "1970-01-01T00:00:00Z");
        // Reserved keys must not survive in the extension map either,
        // or they would shadow the typed fields when serialized.
        for key in RESERVED_KEYS {
            assert!(!md.extra.contains_key(key));
        }
    }

    #[test]
    fn test_metadata_serializes_flat() {
        let base = meta(&[("document_type", json!("contract"))]);
        let tagged = tag(vec!["Text.".to_string()], &base, "tenant-a", "deal.txt");
        let value = serde_json::to_value(&tagged[0].metadata).unwrap();
        assert_eq!(value["client_id"], "tenant-a");
        assert_eq!(value["original_filename"], "deal.txt");
        assert_eq!(value["document_type"], "contract");
    }
}
