//! Port definitions (interfaces to the outside world)

pub mod backend;
pub mod notifier;

pub use backend::{BackendError, BackendSession, ModelBackend};
pub use notifier::{ChatNotifier, CompositeNotifier, NoNotifier};
