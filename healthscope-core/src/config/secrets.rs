//! Secret handling for the completion credential
//!
//! The credential is an opaque bearer string. It is threaded explicitly through
//! every call that needs it and is never printed: both `Debug` and `Display`
//! redact it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A wrapper type for sensitive strings like API keys
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SecretString {
    value: String,
}

/// The bearer credential presented to the completion endpoint.
pub type Credential = SecretString;

impl SecretString {
    /// Create a new secret string
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Get the actual value (use with caution)
    pub fn expose_secret(&self) -> &str {
        &self.value
    }

    /// Check if the secret is empty
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// True when the secret cannot authenticate anything: empty or only whitespace.
    pub fn is_missing(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Get a partially redacted version for debugging
    pub fn partial_redact(&self) -> String {
        if self.value.is_empty() {
            return "[EMPTY]".to_string();
        }

        let chars: Vec<char> = self.value.chars().collect();
        let len = chars.len();
        if len <= 8 {
            "[REDACTED]".to_string()
        } else if self.value.starts_with("sk-") {
            let tail: String = chars[len - 4..].iter().collect();
            format!("sk-...{}", tail)
        } else {
            let head: String = chars[..2].iter().collect();
            let tail: String = chars[len - 2..].iter().collect();
            format!("{}...{}", head, tail)
        }
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
