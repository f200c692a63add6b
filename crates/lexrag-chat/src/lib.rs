//! LexRAG Chat — LLM providers and grounded answer generation.

pub mod config;
pub mod generation;
pub mod providers;
pub mod types;

pub use config::LlmConfig;
pub use generation::{AnswerGenerator, APOLOGY, SYSTEM_PROMPT};
pub use types::{ChatMessage, ContextChunk, LlmProvider, Source};
