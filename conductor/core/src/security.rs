//! Input Validation
//!
//! User text is validated at the boundary before it can touch the session:
//! - Empty or whitespace-only input is dropped silently
//! - Oversized input is rejected (the backend caps `user_text` at 4000 chars)
//! - Control characters other than newline/tab are rejected
//!
//! All validation is fail-safe: when in doubt, reject the input.

use serde::{Deserialize, Serialize};

/// Input limits
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputLimits {
    /// Maximum characters in one submission (default: 4000)
    pub max_input_chars: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_input_chars: 4000,
        }
    }
}

/// Result of input validation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationResult {
    /// Input is valid
    Valid,
    /// Input is empty after trimming; dropped without feedback
    Empty,
    /// Input is invalid with reason
    Invalid(String),
}

/// Input validator for user submissions
#[derive(Debug, Default)]
pub struct InputValidator {
    limits: InputLimits,
}

impl InputValidator {
    /// Create a new input validator with the given limits
    pub fn new(limits: InputLimits) -> Self {
        Self { limits }
    }

    /// Validate a user submission
    pub fn validate_message(&self, content: &str) -> ValidationResult {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return ValidationResult::Empty;
        }

        let chars = trimmed.chars().count();
        if chars > self.limits.max_input_chars {
            return ValidationResult::Invalid(format!(
                "Message too long: {chars} characters (max: {})",
                self.limits.max_input_chars
            ));
        }

        if trimmed
            .chars()
            .any(|c| c.is_control() && c != '\n' && c != '\t' && c != '\r')
        {
            return ValidationResult::Invalid(
                "Message contains invalid control characters".to_string(),
            );
        }

        ValidationResult::Valid
    }
}
