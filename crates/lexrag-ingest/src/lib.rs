//! LexRAG Ingest — text extraction, chunking, tagging, ingestion pipeline.

pub mod chunking;
pub mod extract;
pub mod pipeline;
pub mod tagger;

pub use chunking::Chunker;
pub use pipeline::IngestPipeline;
pub use tagger::{ChunkMetadata, TaggedChunk};
