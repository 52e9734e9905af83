//! Healthscope Core Library
//!
//! This crate provides grounded prompt construction and a streaming
//! chat-completion pipeline for the Healthscope risk and health-plan tools.
//!
//! A typical exchange:
//! 1. Score an [`InputRecord`] locally with [`assessment::assess`]
//! 2. Build a [`CompletionRequest`] with [`RequestBuilder`]
//! 3. Run it through a [`CompletionPipeline`], receiving deltas in a sink

pub mod assessment;
pub mod config;
pub mod http;
pub mod pipeline;
pub mod prompt;
pub mod protocol;
pub mod streaming;

pub use assessment::{Condition, HealthProfile, RiskAssessment};
pub use config::{Credential, HealthscopeConfig, SecretString};
pub use http::{CompletionTransport, HttpTransport};
pub use pipeline::{
    CompletionPipeline, ExchangeEvent, ExchangeFailure, ExchangeState, PipelineError,
    PipelineResult,
};
pub use prompt::{Domain, GenerationSettings, InputRecord, RequestBuilder};
pub use protocol::{CompletionRequest, ExchangeResult, ProtocolFrame};

/// Returns the version of the Healthscope Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
