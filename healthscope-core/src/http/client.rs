//! HTTP transport implementation using reqwest

use super::error::map_http_error;
use super::{CompletionTransport, TransportResponse, CHAT_COMPLETIONS_PATH};
use crate::config::{Credential, EndpointConfig};
use crate::pipeline::{PipelineError, PipelineResult};
use crate::protocol::CompletionRequest;
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Default user agent
const USER_AGENT: &str = concat!("healthscope/", env!("CARGO_PKG_VERSION"));

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Chat-completion transport over a shared, pooled HTTP client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// The underlying reqwest client
    client: Arc<Client>,

    /// Endpoint root, without trailing slash
    base_url: String,
}

impl HttpTransport {
    /// Create a transport with default timeouts
    pub fn new(base_url: impl Into<String>) -> PipelineResult<Self> {
        Self::with_config(base_url, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a transport with custom timeouts
    pub fn with_config(
        base_url: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> PipelineResult<Self> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| PipelineError::TransportUnavailable {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        let base_url: String = base_url.into();
        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a transport from the `endpoint` configuration section
    pub fn from_config(endpoint: &EndpointConfig) -> PipelineResult<Self> {
        Self::with_config(
            endpoint.base_url.clone(),
            Duration::from_secs(endpoint.connect_timeout_secs),
            Duration::from_secs(endpoint.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH)
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn open(
        &self,
        request: &CompletionRequest,
        credential: &Credential,
    ) -> PipelineResult<TransportResponse> {
        let request_id = Uuid::new_v4();
        let url = self.url();

        info!(
            "Opening completion exchange with model {} [request_id: {}]",
            request.model_id(),
            request_id
        );
        debug!("Request URL: {} streaming={} [request_id: {}]", url, request.streaming(), request_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.expose_secret())
            .header("X-Request-ID", request_id.to_string())
            .json(&request.to_body())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!("Request timeout [request_id: {}]", request_id);
                } else {
                    error!("Request error [request_id: {}]: {}", request_id, e);
                }
                PipelineError::TransportUnavailable {
                    message: format!("{} [request_id: {}]", e, request_id),
                }
            })?;

        let status = response.status();
        debug!("Response status: {} [request_id: {}]", status, request_id);

        if !status.is_success() {
            let body = response.text().await.ok();
            warn!("Request rejected with status {} [request_id: {}]", status, request_id);
            return Err(map_http_error(status, body));
        }

        if request.streaming() {
            let stream = response.bytes_stream().map_err(move |e| {
                error!("Stream read failed [request_id: {}]: {}", request_id, e);
                PipelineError::TransportUnavailable {
                    message: format!("Connection lost mid-stream: {} [request_id: {}]", e, request_id),
                }
            });
            return Ok(TransportResponse::Stream(Box::pin(stream)));
        }

        let text = response.text().await.map_err(|e| {
            error!("Failed to read response body [request_id: {}]: {}", request_id, e);
            PipelineError::TransportUnavailable {
                message: format!("Failed to read response body: {} [request_id: {}]", e, request_id),
            }
        })?;

        let document = serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse response [request_id: {}]: {}", request_id, e);
            PipelineError::InvalidResponse(format!("Response is not JSON: {}", e))
        })?;

        info!("Received complete response [request_id: {}]", request_id);
        Ok(TransportResponse::Full(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let transport = HttpTransport::new("https://api.example.com/v1/").unwrap();
        assert_eq!(transport.base_url(), "https://api.example.com/v1");
        assert_eq!(transport.url(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn test_from_config() {
        let transport = HttpTransport::from_config(&EndpointConfig::default()).unwrap();
        assert_eq!(transport.base_url(), "https://api.openai.com/v1");
    }
}
