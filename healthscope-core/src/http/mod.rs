//! HTTP transport for the chat-completion endpoint
//!
//! This module implements the outbound side of an exchange:
//! - One POST per exchange, never retried
//! - Connection pooling and timeouts from configuration
//! - Error mapping from status codes and error documents
//! - Request ID generation and correlation

pub mod client;
pub mod error;

pub use client::HttpTransport;
pub use error::map_http_error;

use crate::config::Credential;
use crate::pipeline::PipelineResult;
use crate::protocol::CompletionRequest;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// Path of the chat-completion endpoint, relative to the base URL
pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Response body delivered chunk by chunk as it arrives
pub type ByteStream = Pin<Box<dyn Stream<Item = PipelineResult<Bytes>> + Send>>;

/// What an opened exchange yields
pub enum TransportResponse {
    /// `streaming == true`: the raw body
    Stream(ByteStream),
    /// `streaming == false`: the single parsed document
    Full(serde_json::Value),
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Full(value) => f.debug_tuple("Full").field(value).finish(),
        }
    }
}

/// Opens completion exchanges against a remote endpoint.
///
/// Implementations make exactly one outbound call per `open`. Non-success
/// statuses become [`PipelineError::RemoteRejected`]; failing to get any
/// response becomes [`PipelineError::TransportUnavailable`].
///
/// [`PipelineError::RemoteRejected`]: crate::pipeline::PipelineError::RemoteRejected
/// [`PipelineError::TransportUnavailable`]: crate::pipeline::PipelineError::TransportUnavailable
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn open(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
    ) -> PipelineResult<TransportResponse>;
}
