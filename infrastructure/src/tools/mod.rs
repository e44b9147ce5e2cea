//! Built-in tools

mod current_date;

pub use current_date::CurrentDateTool;

use std::sync::Arc;
use vault_domain::ToolRegistry;

/// Registry with all built-in tools registered.
pub fn builtin_registry() -> ToolRegistry {
    ToolRegistry::new().register(Arc::new(CurrentDateTool::new()))
}
