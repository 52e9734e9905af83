//! Core protocol types for completion exchanges
//!
//! This module contains the request the pipeline dispatches, the wire formats
//! of the chat-completion endpoint, and the values an exchange produces. The
//! design prioritizes:
//! - Immutability of the request once built
//! - Lenient decoding of response documents (unknown fields are ignored)
//! - A closed set of stream frames

use serde::{Deserialize, Deserializer, Serialize};

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions that guide the model's behavior
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
}

/// A single chat message as sent on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Everything needed to dispatch one completion exchange.
///
/// Built once per user action, then handed to the pipeline by value. The
/// builder methods consume `self`; there is no way to change a request after
/// it has been passed on.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    system_prompt: String,
    user_prompt: String,
    model_id: String,
    temperature: f32,
    max_tokens: u32,
    streaming: bool,
}

impl CompletionRequest {
    /// Default sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.3;
    /// Default completion length limit
    pub const DEFAULT_MAX_TOKENS: u32 = 800;

    /// Create a streaming request with default sampling parameters
    pub fn new(
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            model_id: model_id.into(),
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            streaming: true,
        }
    }

    /// Set the temperature, clamped into `[0, 2]`
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = if temperature.is_nan() {
            Self::DEFAULT_TEMPERATURE
        } else {
            temperature.clamp(0.0, 2.0)
        };
        self
    }

    /// Set the completion length limit (at least 1)
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens.max(1);
        self
    }

    /// Choose between a streamed and a single-document response
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn streaming(&self) -> bool {
        self.streaming
    }

    /// Exactly one system message followed by one user message
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(self.user_prompt.clone()),
        ]
    }

    /// The JSON body posted to the endpoint
    pub fn to_body(&self) -> ChatCompletionBody {
        ChatCompletionBody {
            model: self.model_id.clone(),
            messages: self.messages(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: self.streaming,
        }
    }
}

/// Chat completion request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionBody {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

/// Non-streaming chat completion response.
///
/// Only the fields the pipeline reads are modelled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<ResponseChoice>,
}

impl ChatCompletionResponse {
    /// `choices[0].message.content`
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseChoice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// One decoded `data:` payload of a streamed completion
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamChunk {
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<StreamChoice>,
}

impl StreamChunk {
    /// `choices[0].delta.content`
    pub fn delta_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamChoice {
    #[serde(default, deserialize_with = "null_as_default")]
    pub delta: StreamDelta,
}

/// Only `content` is read; role and any other delta fields are ignored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Treat an explicit `null` like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Error document returned with non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// A single decoded unit of the response stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolFrame {
    /// An incremental, non-empty text fragment
    Delta { text: String },
    /// The explicit end-of-stream sentinel
    Done,
    /// A frame whose payload could not be decoded. Dropped by the accumulator;
    /// the payload is kept for diagnostics only.
    Malformed { payload: String },
}

impl ProtocolFrame {
    pub fn delta(text: impl Into<String>) -> Self {
        Self::Delta { text: text.into() }
    }
}

/// Final aggregate of one exchange
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeResult {
    full_text: String,
    elapsed_ms: f64,
}

impl ExchangeResult {
    pub fn new(full_text: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            full_text: full_text.into(),
            elapsed_ms,
        }
    }

    /// The complete transcript
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Exchange latency in fractional milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn into_text(self) -> String {
        self.full_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = CompletionRequest::new("sys", "usr", "gpt-4o-mini")
            .with_temperature(0.5)
            .with_max_tokens(1500)
            .with_streaming(false);

        let body = serde_json::to_value(request.to_body()).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "sys");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "usr");
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["max_tokens"], 1500);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_request_parameter_bounds() {
        let request = CompletionRequest::new("s", "u", "m")
            .with_temperature(3.7)
            .with_max_tokens(0);
        assert_eq!(request.temperature(), 2.0);
        assert_eq!(request.max_tokens(), 1);

        let request = CompletionRequest::new("s", "u", "m").with_temperature(-1.0);
        assert_eq!(request.temperature(), 0.0);
    }

    #[test]
    fn test_response_text_extraction() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Hi"},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), Some("Hi"));

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_stream_chunk_role_only_delta() {
        let chunk: StreamChunk =
            serde_json::from_str(r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#).unwrap();
        assert_eq!(chunk.delta_text(), None);
    }

    #[test]
    fn test_stream_chunk_ignores_unknown_role() {
        let chunk: StreamChunk = serde_json::from_str(
            r#"{"choices":[{"delta":{"role":"developer","content":"kept"}}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.delta_text(), Some("kept"));
    }

    #[test]
    fn test_null_members_decode_as_empty() {
        let chunk: StreamChunk =
            serde_json::from_str(r#"{"choices":[{"delta":null,"finish_reason":"stop"}]}"#).unwrap();
        assert_eq!(chunk.delta_text(), None);

        let chunk: StreamChunk = serde_json::from_str(r#"{"choices":null}"#).unwrap();
        assert_eq!(chunk.delta_text(), None);

        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":null}]}"#).unwrap();
        assert_eq!(response.text(), None);
    }
}
