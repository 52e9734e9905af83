//! HTTP error mapping utilities

use crate::pipeline::PipelineError;
use crate::protocol::ErrorEnvelope;
use reqwest::StatusCode;

/// Map a non-success status and its body to [`PipelineError::RemoteRejected`].
///
/// The message is `error.message` from an error document when the body has
/// one, otherwise the trimmed body text, otherwise the canonical reason.
pub fn map_http_error(status: StatusCode, body: Option<String>) -> PipelineError {
    PipelineError::RemoteRejected {
        status: status.as_u16(),
        message: error_message(status, body.as_deref()),
    }
}

fn error_message(status: StatusCode, body: Option<&str>) -> String {
    let body = body.map(str::trim).filter(|b| !b.is_empty());

    if let Some(envelope) = body.and_then(|b| serde_json::from_str::<ErrorEnvelope>(b).ok()) {
        if !envelope.error.message.trim().is_empty() {
            return envelope.error.message;
        }
    }

    match body {
        Some(text) => text.to_string(),
        None => status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
    }
}
