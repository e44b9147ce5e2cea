//! Session configuration and generation options

use crate::tool::registry::ToolRegistry;
use serde::{Deserialize, Serialize};

/// Sampling options applied to a single generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Sampling temperature, >= 0.
    pub temperature: f64,
    /// Upper bound on response tokens; `None` means backend default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_response_tokens: Option<u32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_response_tokens: None,
        }
    }
}

impl GenerationOptions {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature.max(0.0);
        self
    }

    pub fn with_max_response_tokens(mut self, max: u32) -> Self {
        self.max_response_tokens = Some(max);
        self
    }
}

/// Configuration a session is bound to at creation time.
///
/// A reset recreates the session with the same config unless the caller
/// supplies a different one.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// System instructions given to the model at session start.
    pub instructions: String,
    /// Default sampling options for the session's requests.
    pub options: GenerationOptions,
    /// Tools the backend may invoke mid-generation. Fixed for the
    /// session's lifetime.
    pub tools: ToolRegistry,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            instructions: "Keep the conversation concise and make it build naturally \
                           from the given topic."
                .to_string(),
            options: GenerationOptions::default(),
            tools: ToolRegistry::new(),
        }
    }
}

impl SessionConfig {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = GenerationOptions::default();
        assert_eq!(options.temperature, 1.0);
        assert!(options.max_response_tokens.is_none());
    }

    #[test]
    fn temperature_clamped_to_non_negative() {
        let options = GenerationOptions::default().with_temperature(-0.5);
        assert_eq!(options.temperature, 0.0);
    }

    #[test]
    fn default_config_has_instructions_and_no_tools() {
        let config = SessionConfig::default();
        assert!(config.instructions.contains("concise"));
        assert!(config.tools.is_empty());
    }
}
