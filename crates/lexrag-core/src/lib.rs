//! LexRAG Core — shared error type and configuration.

pub mod config;
pub mod error;

pub use config::{DataPaths, LexRagConfig};
pub use error::{Error, Result};
