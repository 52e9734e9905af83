//! Environment variable interpolation for configuration

use super::error::ConfigError;
use regex::{Captures, Regex};
use std::env;
use std::sync::LazyLock;

/// Matches `${VAR_NAME}` placeholders.
pub(crate) static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Interpolate environment variables in a configuration string
///
/// Every placeholder must resolve; the first unresolved variable (in document
/// order) is reported.
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    if let Some(missing) = ENV_VAR_PATTERN
        .captures_iter(content)
        .map(|cap| cap[1].to_string())
        .find(|var| env::var(var).is_err())
    {
        return Err(ConfigError::EnvVarNotFound { var: missing });
    }

    let result = ENV_VAR_PATTERN.replace_all(content, |cap: &Captures<'_>| {
        env::var(&cap[1]).unwrap_or_default()
    });

    Ok(result.into_owned())
}

/// Names of all placeholders referenced in `text`.
pub fn referenced_vars(text: &str) -> Vec<String> {
    ENV_VAR_PATTERN
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_env_vars() {
        env::set_var("HEALTHSCOPE_ENV_TEST_VAR", "test_value");

        let content = "api_key: ${HEALTHSCOPE_ENV_TEST_VAR}";
        let result = interpolate_env_vars(content).unwrap();
        assert_eq!(result, "api_key: test_value");

        env::remove_var("HEALTHSCOPE_ENV_TEST_VAR");
    }

    #[test]
    fn test_missing_env_var() {
        let content = "api_key: ${HEALTHSCOPE_DEFINITELY_MISSING}";
        let result = interpolate_env_vars(content);

        match result {
            Err(ConfigError::EnvVarNotFound { var }) => {
                assert_eq!(var, "HEALTHSCOPE_DEFINITELY_MISSING")
            }
            other => panic!("Expected EnvVarNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_and_multiple_vars() {
        env::set_var("HEALTHSCOPE_ENV_A", "one");
        env::set_var("HEALTHSCOPE_ENV_B", "two");

        let content = "${HEALTHSCOPE_ENV_A}-${HEALTHSCOPE_ENV_B}-${HEALTHSCOPE_ENV_A}";
        assert_eq!(interpolate_env_vars(content).unwrap(), "one-two-one");

        env::remove_var("HEALTHSCOPE_ENV_A");
        env::remove_var("HEALTHSCOPE_ENV_B");
    }

    #[test]
    fn test_referenced_vars() {
        let vars = referenced_vars("key: ${OPENAI_API_KEY}, url: ${API_BASE_URL}");
        assert_eq!(vars, vec!["OPENAI_API_KEY", "API_BASE_URL"]);
    }
}
