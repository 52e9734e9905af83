//! Server-sent event frame decoding
//!
//! The completion endpoint streams `data: <json>` lines and finishes with
//! `data: [DONE]`. Transport chunks do not respect line boundaries, so the
//! parser carries the trailing partial line between calls. Bytes are carried
//! rather than text: a multi-byte UTF-8 sequence split across two chunks is
//! only decoded once its line is complete.

use crate::protocol::{ProtocolFrame, StreamChunk};

/// Prefix of a data line
pub const DATA_PREFIX: &str = "data:";

/// Payload marking the end of the stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// Longest line the parser will buffer. A longer line is reported as
/// malformed and skipped up to its newline.
pub const MAX_LINE_BYTES: usize = 1 << 20;

/// Stateful decoder from raw response bytes to [`ProtocolFrame`]s.
#[derive(Debug, Default)]
pub struct EventFrameParser {
    carry: Vec<u8>,
    // Prefix of `carry` already searched for a newline
    scanned: usize,
    // Dropping the rest of an oversized line
    discarding: bool,
    finished: bool,
}

impl EventFrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the `[DONE]` sentinel has been seen. Later input is ignored.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Decode every complete line in `chunk` (plus carried bytes).
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ProtocolFrame> {
        let mut frames = Vec::new();
        if self.finished {
            return frames;
        }

        let chunk = if self.discarding {
            match chunk.iter().position(|b| *b == b'\n') {
                Some(end) => {
                    self.discarding = false;
                    &chunk[end + 1..]
                }
                None => return frames,
            }
        } else {
            chunk
        };

        self.carry.extend_from_slice(chunk);

        let mut consumed = 0;
        let mut search_from = self.scanned;
        while let Some(offset) = self.carry[search_from..].iter().position(|b| *b == b'\n') {
            let end = search_from + offset;
            let line = String::from_utf8_lossy(&self.carry[consumed..end]).into_owned();
            consumed = end + 1;
            search_from = consumed;

            if let Some(frame) = decode_line(&line) {
                let done = frame == ProtocolFrame::Done;
                frames.push(frame);
                if done {
                    self.finished = true;
                    self.reset();
                    return frames;
                }
            }
        }

        self.carry.drain(..consumed);
        self.scanned = self.carry.len();

        if self.carry.len() > MAX_LINE_BYTES {
            frames.push(ProtocolFrame::Malformed {
                payload: format!("line exceeds {} bytes", MAX_LINE_BYTES),
            });
            self.reset();
            self.discarding = true;
        }

        frames
    }

    /// Flush at end of input: a final line without a trailing newline is
    /// decoded as if it had one.
    pub fn finish(&mut self) -> Vec<ProtocolFrame> {
        if self.finished || self.discarding || self.carry.is_empty() {
            self.reset();
            self.discarding = false;
            return Vec::new();
        }

        let line = String::from_utf8_lossy(&self.carry).into_owned();
        self.reset();

        match decode_line(&line) {
            Some(frame) => {
                if frame == ProtocolFrame::Done {
                    self.finished = true;
                }
                vec![frame]
            }
            None => Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.carry.clear();
        self.scanned = 0;
    }
}

/// Decode one complete line. `None` for lines that carry no frame: blanks,
/// non-data fields, comments, and valid payloads without text.
fn decode_line(line: &str) -> Option<ProtocolFrame> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return None;
    }

    let payload = line.strip_prefix(DATA_PREFIX)?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);

    if payload.trim() == DONE_SENTINEL {
        return Some(ProtocolFrame::Done);
    }

    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => chunk
            .delta_text()
            .filter(|text| !text.is_empty())
            .map(ProtocolFrame::delta),
        Err(_) => Some(ProtocolFrame::Malformed {
            payload: payload.to_string(),
        }),
    }
}
