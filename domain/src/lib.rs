//! Domain layer for vault-chat
//!
//! This crate contains the core business logic, entities, and value objects
//! of the chat session core. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Session
//!
//! A session is the backend-side conversational state tied to one
//! [`SessionConfig`], accumulating a [`Transcript`] across turns. At most
//! one session is live per manager; a reset replaces it wholesale.
//!
//! ## Availability
//!
//! [`ModelAvailability`] is queried once per initialization attempt and
//! classifies every unavailability cause into a small set of reasons,
//! preserving unrecognized backend detail verbatim.

pub mod availability;
pub mod error;
pub mod options;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use availability::{ModelAvailability, UnavailableReason};
pub use error::{DomainError, validate_prompt};
pub use options::{GenerationOptions, SessionConfig};
pub use session::{Message, ResponseTurn, Role, ToolInvocation, Transcript};
pub use tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter},
    registry::ToolRegistry,
    traits::{Tool, validate_call},
    value_objects::ToolError,
};
