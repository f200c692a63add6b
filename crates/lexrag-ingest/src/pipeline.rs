//! Document ingestion pipeline: bytes → text → chunks → tagged chunks.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::chunking::Chunker;
use crate::extract;
use crate::tagger::{self, TaggedChunk};
use lexrag_core::Result;

/// Orchestrates extraction, chunking and tagging.
///
/// The pipeline is a pure transformation: it performs no network or
/// index calls. Handing the tagged chunks to the chunk index is the
/// caller's responsibility.
pub struct IngestPipeline {
    chunker: Chunker,
}

impl IngestPipeline {
    /// Build a pipeline with the given chunking configuration.
    /// Fails on invalid configuration only.
    pub fn new(max_chunk_size: usize, overlap: usize) -> Result<Self> {
        Ok(Self {
            chunker: Chunker::new(max_chunk_size, overlap)?,
        })
    }

    /// Ingest one file. Returns tagged chunks in document order, or an
    /// empty sequence when the file yields no extractable text.
    ///
    /// All-or-nothing per file: any extraction failure surfaces as an
    /// error and no chunks are produced.
    pub fn ingest(
        &self,
        file_bytes: &[u8],
        filename: &str,
        base_metadata: &BTreeMap<String, serde_json::Value>,
        client_id: &str,
    ) -> Result<Vec<TaggedChunk>> {
        let text = extract::extract(file_bytes, filename)?;
        if text.trim().is_empty() {
            debug!("No text extracted from {}", filename);
            return Ok(Vec::new());
        }

        let raw_chunks = self.chunker.chunk(&text);
        let tagged = tagger::tag(raw_chunks, base_metadata, client_id, filename);
        info!(
            "Ingested {} into {} chunks for client {}",
            filename,
            tagged.len(),
            client_id
        );
        Ok(tagged)
    }
}

impl Default for IngestPipeline {
    fn default() -> Self {
        Self {
            chunker: Chunker::default(),
        }
    }
}
