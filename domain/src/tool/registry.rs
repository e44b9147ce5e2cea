//! Tool registry
//!
//! An ordered, fixed list of tools bound to a session at creation time.
//! The registry routes a [`ToolCall`] to the matching tool, validating
//! arguments against the tool's definition first. It does not decide
//! *when* tools run; that is the backend's job during generation.

use std::sync::Arc;

use super::entities::{ToolCall, ToolDefinition};
use super::traits::{Tool, validate_call};
use super::value_objects::ToolError;

/// Ordered collection of tools available to a session.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool (builder pattern). Registration order is the
    /// order definitions are surfaced to the backend.
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.definition().name == name)
    }

    /// Definitions of all registered tools, in registration order.
    pub fn definitions(&self) -> Vec<&ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Validate and invoke a tool call.
    ///
    /// Fails with `NOT_FOUND` for unknown tools and `INVALID_ARGUMENT`
    /// before the tool body runs for malformed calls.
    pub async fn dispatch(&self, call: &ToolCall) -> Result<String, ToolError> {
        let tool = self
            .get(&call.tool_name)
            .ok_or_else(|| ToolError::not_found(&call.tool_name))?;

        validate_call(call, tool.definition())?;
        tool.invoke(call).await
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field(
                "tools",
                &self
                    .tools
                    .iter()
                    .map(|t| t.definition().name.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
