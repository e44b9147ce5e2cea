//! Application layer for vault-chat
//!
//! This crate contains the use cases and port definitions of the session
//! core: the [`SessionManager`] lifecycle, response generation, and the
//! [`typewriter`] streaming simulator. It depends only on the domain layer.

pub mod ports;
pub mod session_manager;
pub mod typewriter;

// Re-export commonly used types
pub use ports::{
    backend::{BackendError, BackendSession, ModelBackend},
    notifier::{ChatNotifier, CompositeNotifier, NoNotifier},
};
pub use session_manager::{GenerationError, InitError, SessionManager};
pub use typewriter::{DEFAULT_TICK, TypewriterHandle, simulate};
