//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid prompt: {0}")]
    InvalidPrompt(String),

    #[error("Invalid session config: {0}")]
    InvalidConfig(String),
}

/// Returns the prompt trimmed, or an error if it is empty or
/// whitespace-only. Empty prompts must never produce a backend request.
pub fn validate_prompt(prompt: &str) -> Result<&str, DomainError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidPrompt(
            "prompt must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prompt_rejected() {
        assert!(validate_prompt("").is_err());
        assert!(validate_prompt("   \n\t").is_err());
    }

    #[test]
    fn prompt_trimmed() {
        assert_eq!(validate_prompt("  hello  ").unwrap(), "hello");
    }
}
