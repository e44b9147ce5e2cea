//! Infrastructure layer for vault-chat
//!
//! Adapters behind the application layer's ports: the Ollama model
//! backend, built-in tools, configuration loading, and JSONL chat
//! logging.

pub mod backend;
pub mod config;
pub mod logging;
pub mod tools;

// Re-export commonly used types
pub use backend::{OllamaBackend, OllamaConfig};
pub use config::{ConfigLoader, FileConfig};
pub use logging::JsonlTranscriptLogger;
pub use tools::{CurrentDateTool, builtin_registry};
