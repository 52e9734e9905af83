//! Streaming response handling
//!
//! Bytes from the transport pass through [`EventFrameParser`] into
//! [`ProtocolFrame`]s, which [`IncrementalAccumulator`] applies to the
//! exchange transcript while forwarding each delta to the caller's sink.
//!
//! [`ProtocolFrame`]: crate::protocol::ProtocolFrame

pub mod accumulator;
pub mod parser;
pub mod timer;

pub use accumulator::{IncrementalAccumulator, Transcript};
pub use parser::{EventFrameParser, DATA_PREFIX, DONE_SENTINEL, MAX_LINE_BYTES};
pub use timer::LatencyTimer;
