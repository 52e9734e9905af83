//! Configuration validation utilities

use super::env::referenced_vars;
use super::error::{ValidationError, ValidationErrorKind};
use super::schema::HealthscopeConfig;

/// Configuration validator with additional validation rules
#[derive(Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a configuration with extended rules
    pub fn validate(&self, config: &HealthscopeConfig) -> Result<(), ValidationError> {
        // First run the built-in validation
        config.validate()?;

        self.validate_placeholders(config)?;

        Ok(())
    }

    /// Placeholders that survived interpolation would be sent verbatim.
    fn validate_placeholders(&self, config: &HealthscopeConfig) -> Result<(), ValidationError> {
        if let Some(api_key) = &config.api_key {
            if let Some(var) = referenced_vars(api_key.expose_secret()).into_iter().next() {
                return Err(ValidationError::new(
                    "api_key",
                    ValidationErrorKind::UnresolvedPlaceholder {
                        placeholder: format!("${{{}}}", var),
                    },
                ));
            }
        }

        if let Some(var) = referenced_vars(&config.endpoint.base_url).into_iter().next() {
            return Err(ValidationError::new(
                "endpoint.base_url",
                ValidationErrorKind::UnresolvedPlaceholder {
                    placeholder: format!("${{{}}}", var),
                },
            ));
        }

        Ok(())
    }
}
