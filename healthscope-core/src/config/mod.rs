//! Configuration module for Healthscope
//!
//! This module provides the configuration schema and validation, the redacting
//! credential type, and the credential store adapters.

mod env;
mod error;
mod schema;
mod secrets;
mod store;
mod validator;

pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{
    EndpointConfig, GenerationConfig, GenerationParams, HealthscopeConfig, ModelConfig,
    SUPPORTED_VERSION,
};
pub use secrets::{Credential, SecretString};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore, CREDENTIAL_KEY};
pub use validator::ConfigValidator;

use std::fs;
use std::path::Path;

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<HealthscopeConfig, ConfigError> {
    let path = path.as_ref();
    let content = read_config(path)?;

    // Interpolate environment variables before parsing
    let interpolated = env::interpolate_env_vars(&content)?;

    let config: HealthscopeConfig =
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<HealthscopeConfig, ConfigError> {
    let path = path.as_ref();
    let content = read_config(path)?;

    // Interpolate environment variables before parsing
    let interpolated = env::interpolate_env_vars(&content)?;

    let config: HealthscopeConfig =
        serde_json::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

/// Load a configuration, picking the format from the file extension
/// (`.json` is JSON, anything else is YAML).
pub fn load<P: AsRef<Path>>(path: P) -> Result<HealthscopeConfig, ConfigError> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_from_json(path),
        _ => load_from_yaml(path),
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}
