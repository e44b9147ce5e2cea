//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the config file and
//! are deserialized directly; conversion to domain types happens in
//! [`to_session_config`](FileConfig::to_session_config).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vault_domain::{GenerationOptions, SessionConfig};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model backend settings
    pub model: FileModelConfig,
    /// Typewriter stream settings
    pub stream: FileStreamConfig,
}

/// `[model]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Ollama server endpoint
    pub endpoint: String,
    /// Model name
    pub name: String,
    /// System instructions the session starts with
    pub instructions: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Response token cap; absent means backend default
    pub max_response_tokens: Option<u32>,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            endpoint: "http://localhost:11434".to_string(),
            name: "llama3.2:3b".to_string(),
            instructions: defaults.instructions,
            temperature: defaults.options.temperature,
            max_response_tokens: None,
        }
    }
}

/// `[stream]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStreamConfig {
    /// Milliseconds between typewriter emissions
    pub tick_ms: u64,
}

impl Default for FileStreamConfig {
    fn default() -> Self {
        Self { tick_ms: 50 }
    }
}

impl FileConfig {
    /// Build the session config these settings describe. The tool
    /// registry is supplied by the caller; the file only carries
    /// scalar settings.
    pub fn to_session_config(&self) -> SessionConfig {
        let mut options = GenerationOptions::default().with_temperature(self.model.temperature);
        if let Some(max) = self.model.max_response_tokens {
            options = options.with_max_response_tokens(max);
        }
        SessionConfig::new(self.model.instructions.clone()).with_options(options)
    }

    /// Typewriter tick as a duration.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.stream.tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_session_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.model.temperature, 1.0);
        assert_eq!(config.stream.tick_ms, 50);
        assert_eq!(config.tick(), Duration::from_millis(50));

        let session = config.to_session_config();
        assert!(session.instructions.contains("concise"));
        assert!(session.options.max_response_tokens.is_none());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [model]
            name = "qwen2.5:7b"
            temperature = 0.3

            [stream]
            tick_ms = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.model.name, "qwen2.5:7b");
        assert_eq!(config.model.temperature, 0.3);
        assert_eq!(config.model.endpoint, "http://localhost:11434");
        assert_eq!(config.stream.tick_ms, 25);
    }

    #[test]
    fn max_tokens_carries_into_options() {
        let config: FileConfig = toml::from_str(
            r#"
            [model]
            max_response_tokens = 256
            "#,
        )
        .unwrap();

        let session = config.to_session_config();
        assert_eq!(session.options.max_response_tokens, Some(256));
    }
}
