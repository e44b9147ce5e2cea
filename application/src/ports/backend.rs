//! Model backend port
//!
//! Defines the interface the application layer uses to talk to a
//! language-model backend. The only contract the core depends on is
//! "given a prompt and options, asynchronously return full text or an
//! error"; adapters live in the infrastructure layer.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use vault_domain::{GenerationOptions, ModelAvailability, ResponseTurn, SessionConfig};

/// Errors that can occur inside a backend adapter
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Tool invocation failed: {0}")]
    Tool(String),
}

/// Gateway to a language-model backend.
///
/// The availability query never errors: every failure mode the adapter
/// observes is classified into a [`ModelAvailability`] value.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Query whether the model backend is usable right now.
    async fn availability(&self) -> ModelAvailability;

    /// Open a conversational session bound to the given config
    /// (instructions, sampling options, tool registry).
    async fn open_session(
        &self,
        config: &SessionConfig,
    ) -> Result<Arc<dyn BackendSession>, BackendError>;
}

/// An active backend session holding model-side conversational state.
#[async_trait]
pub trait BackendSession: Send + Sync {
    /// Submit one prompt and wait for the completed turn: the full
    /// response text plus any tool invocations the backend resolved
    /// mid-generation.
    ///
    /// Exactly one backend request per call; never retried here.
    async fn respond(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<ResponseTurn, BackendError>;
}
