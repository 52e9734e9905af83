//! Protocol module for completion request/response structures
//!
//! This module defines the request handed to the transport, the chat-completion
//! wire formats, the frames decoded from a streamed response, and the final
//! exchange result.

pub mod types;

pub use types::{
    ChatCompletionBody, ChatCompletionResponse, ChatMessage, CompletionRequest, ErrorBody,
    ErrorEnvelope, ExchangeResult, MessageRole, ProtocolFrame, ResponseChoice, ResponseMessage,
    StreamChoice, StreamChunk, StreamDelta,
};
