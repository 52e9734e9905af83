//! Pipeline error types

use crate::protocol::ExchangeResult;
use thiserror::Error;

/// Terminal failure of a completion exchange
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// No credential configured, or only whitespace
    #[error("No API key configured")]
    CredentialMissing,

    /// The endpoint could not be reached, or the connection dropped
    #[error("Transport unavailable: {message}")]
    TransportUnavailable { message: String },

    /// The endpoint answered with a non-success status
    #[error("Request rejected with status {status}: {message}")]
    RemoteRejected { status: u16, message: String },

    /// Another exchange is already running on this pipeline
    #[error("An exchange is already in progress")]
    Busy,

    /// The exchange was cancelled by the caller
    #[error("Exchange cancelled")]
    Cancelled,

    /// The response document did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl PipelineError {
    /// Whether repeating the same exchange later could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TransportUnavailable { .. } => true,
            Self::Busy => true,
            Self::RemoteRejected { status, .. } => *status == 429 || *status >= 500,
            Self::CredentialMissing => false,
            Self::Cancelled => false,
            Self::InvalidResponse(_) => false,
        }
    }

    /// Guidance shown to the user alongside the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CredentialMissing => Some("Configure an API key with `healthscope key set <KEY>`."),
            Self::TransportUnavailable { .. } => {
                Some("Check your network connection and try again.")
            }
            Self::Busy => Some("Wait for the running exchange to finish."),
            Self::RemoteRejected { status: 401, .. } => Some("Check that the API key is valid."),
            Self::RemoteRejected { .. } if self.is_retryable() => Some("Try again in a moment."),
            _ => None,
        }
    }
}

/// A failed exchange together with whatever text arrived before the failure
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct ExchangeFailure {
    #[source]
    pub error: PipelineError,
    pub partial: ExchangeResult,
}

impl ExchangeFailure {
    pub fn new(error: PipelineError, partial: ExchangeResult) -> Self {
        Self { error, partial }
    }

    pub fn error(&self) -> &PipelineError {
        &self.error
    }

    /// Text accumulated before the failure, with the elapsed latency
    pub fn partial(&self) -> &ExchangeResult {
        &self.partial
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(PipelineError::TransportUnavailable { message: "refused".into() }, true ; "transport")]
    #[test_case(PipelineError::RemoteRejected { status: 503, message: "down".into() }, true ; "server error")]
    #[test_case(PipelineError::RemoteRejected { status: 429, message: "slow".into() }, true ; "rate limited")]
    #[test_case(PipelineError::RemoteRejected { status: 401, message: "bad key".into() }, false ; "unauthorized")]
    #[test_case(PipelineError::CredentialMissing, false ; "missing credential")]
    #[test_case(PipelineError::Cancelled, false ; "cancelled")]
    fn test_retryable(error: PipelineError, expected: bool) {
        assert_eq!(error.is_retryable(), expected);
    }

    #[test]
    fn test_remote_rejection_is_verbatim() {
        let error = PipelineError::RemoteRejected {
            status: 401,
            message: "invalid api key".to_string(),
        };
        assert_eq!(error.to_string(), "Request rejected with status 401: invalid api key");
        assert_eq!(error.hint(), Some("Check that the API key is valid."));
    }

    #[test]
    fn test_failure_displays_error_and_keeps_partial() {
        let failure = ExchangeFailure::new(
            PipelineError::Cancelled,
            ExchangeResult::new("Hel", 12.0),
        );
        assert_eq!(failure.to_string(), "Exchange cancelled");
        assert_eq!(failure.partial().full_text(), "Hel");
        assert!(std::error::Error::source(&failure).is_some());
    }
}
