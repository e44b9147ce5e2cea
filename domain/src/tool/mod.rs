//! Tool domain.
//!
//! - [`entities::ToolDefinition`] — a tool's declared name/description/schema
//! - [`traits::Tool`] — the per-tool async callable
//! - [`registry::ToolRegistry`] — the fixed per-session tool list with
//!   validate-then-invoke dispatch

pub mod entities;
pub mod registry;
pub mod traits;
pub mod value_objects;
