//! Grounded prompt construction
//!
//! Turns a [`Domain`] and an [`InputRecord`] into a [`CompletionRequest`]
//! whose system prompt carries the fixed grounding context and whose user
//! prompt enumerates the caller's fields.
//!
//! [`CompletionRequest`]: crate::protocol::CompletionRequest

mod builder;
pub mod context;
mod record;

pub use builder::{Domain, GenerationSettings, RequestBuilder};
pub use context::{DatasetContext, ProfileField, PROFILE_SCHEMA};
pub use record::{FieldValue, InputRecord};
