//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Dataset loading (JSON)
//! - Embeddings (character n-grams, mock for tests)
//! - Completion services (Together / OpenAI-compatible, Anthropic)

pub mod adapter;

pub use adapter::*;
