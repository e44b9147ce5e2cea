//! Tool trait and call validation
//!
//! A [`Tool`] is a named, schema-typed callable the model backend may
//! invoke mid-generation. Validation of a call against a definition is
//! pure domain logic with no I/O.

use async_trait::async_trait;

use super::entities::{ToolCall, ToolDefinition};
use super::value_objects::ToolError;

/// A pluggable callable capability registered with a session.
///
/// The backend invokes tools by name with arguments matching the
/// declared parameters, and folds the string result into its own
/// reasoning before producing the final response.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Static definition: name, description, parameters.
    fn definition(&self) -> &ToolDefinition;

    /// Invoke the tool with validated arguments.
    async fn invoke(&self, call: &ToolCall) -> Result<String, ToolError>;
}

/// Validate a tool call against its definition.
///
/// Checks that every required parameter is present and that no unknown
/// argument was supplied.
pub fn validate_call(call: &ToolCall, definition: &ToolDefinition) -> Result<(), ToolError> {
    for param in &definition.parameters {
        if param.required && !call.arguments.contains_key(&param.name) {
            return Err(ToolError::invalid_argument(format!(
                "Missing required parameter '{}' for tool '{}'",
                param.name, definition.name
            )));
        }
    }

    let valid_params: std::collections::HashSet<&str> = definition
        .parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect();

    for arg_name in call.arguments.keys() {
        if !valid_params.contains(arg_name.as_str()) {
            return Err(ToolError::invalid_argument(format!(
                "Unknown parameter '{}' for tool '{}'",
                arg_name, definition.name
            )));
        }
    }

    Ok(())
}
