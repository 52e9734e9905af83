//! Configuration schema structures with serde support

use super::error::{ValidationError, ValidationErrorKind};
use super::secrets::SecretString;
use serde::{Deserialize, Serialize};

/// Root configuration structure for Healthscope
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HealthscopeConfig {
    /// Schema version (required - no default)
    pub version: String,

    /// Completion endpoint settings
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Model selection
    #[serde(default)]
    pub model: ModelConfig,

    /// Per-domain generation parameters
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Optional credential (supports environment variable interpolation).
    /// A stored credential is used when this is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,
}

impl Default for HealthscopeConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_VERSION.to_string(),
            endpoint: EndpointConfig::default(),
            model: ModelConfig::default(),
            generation: GenerationConfig::default(),
            api_key: None,
        }
    }
}

/// Completion endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// Base URL; the chat completion path is appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds, including the streamed body
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Model configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Model identifier (e.g., "gpt-4o-mini")
    #[serde(default = "default_model_id")]
    pub id: String,

    /// Request incremental (streamed) completions
    #[serde(default = "default_true")]
    pub streaming: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            id: default_model_id(),
            streaming: true,
        }
    }
}

/// Sampling parameters for one domain
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Generation parameters per prompt domain
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Risk explanations
    #[serde(default = "default_explanation_params")]
    pub explanation: GenerationParams,

    /// Personalised health plans
    #[serde(default = "default_health_plan_params")]
    pub health_plan: GenerationParams,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            explanation: default_explanation_params(),
            health_plan: default_health_plan_params(),
        }
    }
}

/// The only schema version understood by this release
pub const SUPPORTED_VERSION: &str = "0.1";

// Default value functions for serde
fn default_true() -> bool { true }
fn default_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_connect_timeout() -> u64 { 10 }
fn default_request_timeout() -> u64 { 120 }
fn default_model_id() -> String { "gpt-4o-mini".to_string() }
fn default_explanation_params() -> GenerationParams {
    GenerationParams { temperature: 0.3, max_tokens: 800 }
}
fn default_health_plan_params() -> GenerationParams {
    GenerationParams { temperature: 0.5, max_tokens: 1500 }
}

impl HealthscopeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version.is_empty() {
            return Err(ValidationError::required("version"));
        }

        if self.version != SUPPORTED_VERSION {
            return Err(ValidationError::new(
                "version",
                ValidationErrorKind::InvalidVersion {
                    expected: SUPPORTED_VERSION.to_string(),
                    actual: self.version.clone(),
                },
            ));
        }

        self.endpoint.validate("endpoint")?;

        if self.model.id.trim().is_empty() {
            return Err(ValidationError::required("model.id"));
        }

        self.generation.explanation.validate("generation.explanation")?;
        self.generation.health_plan.validate("generation.health_plan")?;

        Ok(())
    }
}

impl EndpointConfig {
    /// Validate endpoint configuration
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::required(format!("{}.base_url", path)));
        }

        match url::Url::parse(&self.base_url) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    return Err(ValidationError::new(
                        format!("{}.base_url", path),
                        ValidationErrorKind::InvalidUrl {
                            message: format!("URL scheme must be http or https, got: {}", url.scheme()),
                        },
                    ));
                }
            }
            Err(e) => {
                return Err(ValidationError::new(
                    format!("{}.base_url", path),
                    ValidationErrorKind::InvalidUrl {
                        message: e.to_string(),
                    },
                ));
            }
        }

        if self.connect_timeout_secs == 0 {
            return Err(ValidationError::out_of_range(
                format!("{}.connect_timeout_secs", path),
                "Must be greater than 0",
            ));
        }

        if self.request_timeout_secs < self.connect_timeout_secs {
            return Err(ValidationError::out_of_range(
                format!("{}.request_timeout_secs", path),
                "Must be >= connect_timeout_secs",
            ));
        }

        Ok(())
    }
}

impl GenerationParams {
    /// Validate sampling parameters
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::out_of_range(
                format!("{}.temperature", path),
                "Must be between 0.0 and 2.0",
            ));
        }

        if self.max_tokens == 0 {
            return Err(ValidationError::out_of_range(
                format!("{}.max_tokens", path),
                "Must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = HealthscopeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.generation.explanation.max_tokens, 800);
        assert_eq!(config.generation.health_plan.temperature, 0.5);
    }

    #[test]
    fn test_temperature_out_of_range() {
        let mut config = HealthscopeConfig::default();
        config.generation.health_plan.temperature = 2.5;

        let err = config.validate().unwrap_err();
        assert_eq!(err.field_path, "generation.health_plan.temperature");
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let mut config = HealthscopeConfig::default();
        config.endpoint.base_url = "ftp://example.com".to_string();

        let err = config.validate().unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::InvalidUrl { .. }));
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config: HealthscopeConfig = serde_yaml::from_str("version: \"0.1\"\n").unwrap();
        assert_eq!(config.model.id, "gpt-4o-mini");
        assert!(config.model.streaming);
        assert!(config.api_key.is_none());
    }
}
