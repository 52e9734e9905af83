//! Configuration error types with detailed error reporting

use thiserror::Error;

/// Main configuration error type with detailed context
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config from '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in '{path}' at line {}, column {}: {message}",
            .line.unwrap_or(0), .column.unwrap_or(0))]
    ParseError {
        path: String,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Environment variable '{var}' not found")]
    EnvVarNotFound { var: String },

    #[error("Credential store '{path}' is unreadable: {message}")]
    CorruptStore { path: String, message: String },
}

/// A rejected config value and where it sits in the document
#[derive(Debug, Error)]
#[error("Validation failed at '{field_path}': {kind}")]
pub struct ValidationError {
    /// Dotted path of the field, e.g. `generation.explanation.temperature`
    pub field_path: String,
    pub kind: ValidationErrorKind,
}

/// Specific validation error types
#[derive(Debug, Error)]
pub enum ValidationErrorKind {
    #[error("required field is missing")]
    RequiredFieldMissing,

    #[error("value out of range: {message}")]
    OutOfRange { message: String },

    #[error("invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("invalid version: expected {expected}, got {actual}")]
    InvalidVersion { expected: String, actual: String },

    #[error("unresolved placeholder: {placeholder}")]
    UnresolvedPlaceholder { placeholder: String },
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field_path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field_path: field_path.into(),
            kind,
        }
    }

    /// Helper to create a required field error
    pub fn required(field_path: impl Into<String>) -> Self {
        Self::new(field_path, ValidationErrorKind::RequiredFieldMissing)
    }

    /// Helper to create an out of range error
    pub fn out_of_range(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::OutOfRange {
                message: message.into(),
            },
        )
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
