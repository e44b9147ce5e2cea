//! Built-in current_date tool

use async_trait::async_trait;
use chrono::Local;
use vault_domain::{Tool, ToolCall, ToolDefinition, ToolError, ToolParameter};

/// Returns today's date in full written form.
pub struct CurrentDateTool {
    definition: ToolDefinition,
}

impl CurrentDateTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new("current_date", "Returns the current date")
                .with_parameter(ToolParameter::new("date", "The date to format", false)),
        }
    }
}

impl Default for CurrentDateTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CurrentDateTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, _call: &ToolCall) -> Result<String, ToolError> {
        // Full style, e.g. "Friday, June 5, 2026"
        let today = Local::now().format("%A, %B %-d, %Y");
        Ok(format!("Today's date is {}", today))
    }
}
