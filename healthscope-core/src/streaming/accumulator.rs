//! Transcript accumulation

use super::timer::LatencyTimer;
use crate::protocol::{ExchangeResult, ProtocolFrame};

/// Ordered, append-only sequence of delta fragments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    fragments: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Fragments concatenated in arrival order
    pub fn text(&self) -> String {
        self.fragments.concat()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Applies frames to a transcript and forwards deltas to a sink.
///
/// The accumulator owns the transcript for the lifetime of one exchange.
/// After `Done` every frame is ignored, so the sink never sees text that
/// arrives past the terminator.
#[derive(Debug)]
pub struct IncrementalAccumulator {
    transcript: Transcript,
    completed: bool,
    timer: LatencyTimer,
}

impl IncrementalAccumulator {
    pub fn new(timer: LatencyTimer) -> Self {
        Self {
            transcript: Transcript::new(),
            completed: false,
            timer,
        }
    }

    /// Apply one frame. `sink` is invoked synchronously for each delta.
    pub fn on_frame<F>(&mut self, frame: ProtocolFrame, sink: &mut F)
    where
        F: FnMut(&str),
    {
        if self.completed {
            return;
        }

        match frame {
            ProtocolFrame::Delta { text } => {
                sink(&text);
                self.transcript.push(text);
            }
            ProtocolFrame::Done => self.completed = true,
            ProtocolFrame::Malformed { .. } => {}
        }
    }

    /// True once `Done` has been applied
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Freeze the transcript with the elapsed latency, whether or not `Done`
    /// was seen.
    pub fn finalize(self) -> ExchangeResult {
        ExchangeResult::new(self.transcript.text(), self.timer.elapsed_ms())
    }
}
