//! Completion exchange orchestration
//!
//! A [`CompletionPipeline`] drives one exchange at a time through
//! `Idle → Requesting → Streaming → Completed`, ending in `Failed` or
//! `Cancelled` instead when something goes wrong. Output is available two
//! ways:
//! - [`CompletionPipeline::stream`] yields [`ExchangeEvent`]s lazily
//! - [`CompletionPipeline::execute`] consumes that stream, pushing each delta
//!   into a sink and returning the final [`ExchangeResult`]
//!
//! Every terminal failure carries the partial transcript.

mod error;
mod guard;

pub use error::{ExchangeFailure, PipelineError, PipelineResult};

use crate::config::{Credential, HealthscopeConfig};
use crate::http::{CompletionTransport, HttpTransport, TransportResponse};
use crate::protocol::{ChatCompletionResponse, CompletionRequest, ExchangeResult, ProtocolFrame};
use crate::streaming::{EventFrameParser, IncrementalAccumulator, LatencyTimer};
use async_stream::stream;
use futures::{Stream, StreamExt};
use guard::{ExchangeSlot, SlotGuard};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Lifecycle of the most recent exchange on a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    Requesting,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl ExchangeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// One item of a pulled exchange. The last item is always `Finished` or
/// `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeEvent {
    Delta(String),
    Finished(ExchangeResult),
    Failed(ExchangeFailure),
}

/// Runs completion exchanges for a single surface.
///
/// Clones share the transport, the state and the in-flight slot, so a
/// second exchange started from any clone while one is running fails with
/// [`PipelineError::Busy`].
#[derive(Clone)]
pub struct CompletionPipeline {
    transport: Arc<dyn CompletionTransport>,
    state: Arc<Mutex<ExchangeState>>,
    slot: ExchangeSlot,
}

impl std::fmt::Debug for CompletionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionPipeline")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CompletionPipeline {
    pub fn new(transport: Arc<dyn CompletionTransport>) -> Self {
        Self {
            transport,
            state: Arc::new(Mutex::new(ExchangeState::Idle)),
            slot: ExchangeSlot::new(),
        }
    }

    /// Pipeline over an [`HttpTransport`] built from the endpoint section
    pub fn from_config(config: &HealthscopeConfig) -> PipelineResult<Self> {
        let transport = HttpTransport::from_config(&config.endpoint)?;
        Ok(Self::new(Arc::new(transport)))
    }

    pub fn state(&self) -> ExchangeState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// True while an exchange holds this surface
    pub fn is_busy(&self) -> bool {
        self.slot.is_held()
    }

    fn transition(&self, next: ExchangeState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        debug!("Exchange state {:?} -> {:?}", *state, next);
        *state = next;
    }

    /// Start an exchange and yield its events as they happen.
    ///
    /// Nothing runs until the stream is first polled; the latency timer starts
    /// then. Dropping the stream early abandons the exchange and closes the
    /// connection.
    pub fn stream(
        &self,
        request: CompletionRequest,
        credential: Credential,
        cancel: CancellationToken,
    ) -> impl Stream<Item = ExchangeEvent> + Send + 'static {
        let this = self.clone();

        stream! {
            let timer = LatencyTimer::start();
            let mut accumulator = IncrementalAccumulator::new(timer);

            let _scope = match this.slot.try_acquire() {
                Some(slot) => ExchangeScope::new(slot, Arc::clone(&this.state)),
                None => {
                    warn!("Rejecting exchange: another exchange is in progress");
                    yield ExchangeEvent::Failed(ExchangeFailure::new(
                        PipelineError::Busy,
                        accumulator.finalize(),
                    ));
                    return;
                }
            };
            this.transition(ExchangeState::Idle);

            if credential.is_missing() {
                yield this.fail(PipelineError::CredentialMissing, accumulator);
                return;
            }
            if cancel.is_cancelled() {
                yield this.fail(PipelineError::Cancelled, accumulator);
                return;
            }

            info!(
                "Starting exchange with model {} (streaming={})",
                request.model_id(),
                request.streaming()
            );
            this.transition(ExchangeState::Requesting);

            let opened = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = this.transport.open(&request, &credential) => Some(result),
            };
            let response = match opened {
                Some(Ok(response)) => response,
                Some(Err(error)) => {
                    yield this.fail(error, accumulator);
                    return;
                }
                None => {
                    yield this.fail(PipelineError::Cancelled, accumulator);
                    return;
                }
            };

            this.transition(ExchangeState::Streaming);

            match response {
                TransportResponse::Full(document) => match full_text(document) {
                    Ok(text) => {
                        if !text.is_empty() {
                            if let Some(fragment) = apply(&mut accumulator, ProtocolFrame::delta(text)) {
                                yield ExchangeEvent::Delta(fragment);
                            }
                        }
                    }
                    Err(error) => {
                        yield this.fail(error, accumulator);
                        return;
                    }
                },
                TransportResponse::Stream(mut body) => {
                    let mut parser = EventFrameParser::new();
                    loop {
                        let next = tokio::select! {
                            biased;
                            _ = cancel.cancelled() => None,
                            chunk = body.next() => Some(chunk),
                        };
                        let chunk = match next {
                            Some(Some(Ok(chunk))) => chunk,
                            Some(Some(Err(error))) => {
                                yield this.fail(error, accumulator);
                                return;
                            }
                            Some(None) => {
                                debug!("Stream ended without terminator");
                                for frame in parser.finish() {
                                    if cancel.is_cancelled() {
                                        yield this.fail(PipelineError::Cancelled, accumulator);
                                        return;
                                    }
                                    if let Some(fragment) = apply(&mut accumulator, frame) {
                                        yield ExchangeEvent::Delta(fragment);
                                    }
                                }
                                break;
                            }
                            None => {
                                drop(body);
                                yield this.fail(PipelineError::Cancelled, accumulator);
                                return;
                            }
                        };

                        // The consumer may cancel while handling an earlier
                        // delta of this same chunk
                        for frame in parser.feed(&chunk) {
                            if cancel.is_cancelled() {
                                drop(body);
                                yield this.fail(PipelineError::Cancelled, accumulator);
                                return;
                            }
                            if let Some(fragment) = apply(&mut accumulator, frame) {
                                yield ExchangeEvent::Delta(fragment);
                            }
                        }
                        if accumulator.is_complete() {
                            break;
                        }
                    }
                }
            }

            let result = accumulator.finalize();
            this.transition(ExchangeState::Completed);
            info!(
                "Exchange completed: {} chars in {:.1} ms",
                result.full_text().chars().count(),
                result.elapsed_ms()
            );
            yield ExchangeEvent::Finished(result);
        }
    }

    /// Run an exchange to completion, invoking `sink` once per delta in
    /// arrival order.
    ///
    /// On success the returned text equals the concatenation of every sink
    /// call. On failure the [`ExchangeFailure`] carries the text delivered so
    /// far.
    pub async fn execute<F>(
        &self,
        request: CompletionRequest,
        credential: Credential,
        cancel: CancellationToken,
        mut sink: F,
    ) -> Result<ExchangeResult, ExchangeFailure>
    where
        F: FnMut(&str),
    {
        let events = self.stream(request, credential, cancel);
        futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            match event {
                ExchangeEvent::Delta(text) => sink(&text),
                ExchangeEvent::Finished(result) => return Ok(result),
                ExchangeEvent::Failed(failure) => return Err(failure),
            }
        }

        Err(ExchangeFailure::new(
            PipelineError::InvalidResponse("exchange ended without a result".to_string()),
            ExchangeResult::default(),
        ))
    }

    fn fail(&self, error: PipelineError, accumulator: IncrementalAccumulator) -> ExchangeEvent {
        let partial = accumulator.finalize();
        match error {
            PipelineError::Cancelled => {
                warn!(
                    "Exchange cancelled after {} chars",
                    partial.full_text().chars().count()
                );
                self.transition(ExchangeState::Cancelled);
            }
            ref other => {
                warn!("Exchange failed: {}", other);
                self.transition(ExchangeState::Failed);
            }
        }
        ExchangeEvent::Failed(ExchangeFailure::new(error, partial))
    }
}

/// Holds the in-flight slot for one exchange. An exchange abandoned before
/// reaching a terminal state is recorded as cancelled.
struct ExchangeScope {
    _slot: SlotGuard,
    state: Arc<Mutex<ExchangeState>>,
}

impl ExchangeScope {
    fn new(slot: SlotGuard, state: Arc<Mutex<ExchangeState>>) -> Self {
        Self { _slot: slot, state }
    }
}

impl Drop for ExchangeScope {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.is_terminal() {
            debug!("Exchange abandoned in state {:?}", *state);
            *state = ExchangeState::Cancelled;
        }
    }
}

/// Apply one frame, returning the delta text handed to the sink, if any.
fn apply(accumulator: &mut IncrementalAccumulator, frame: ProtocolFrame) -> Option<String> {
    if let ProtocolFrame::Malformed { payload } = &frame {
        warn!("Skipping malformed frame: {}", payload);
    }
    let mut delivered = None;
    accumulator.on_frame(frame, &mut |text: &str| delivered = Some(text.to_string()));
    delivered
}

/// `choices[0].message.content` of a non-streaming response
fn full_text(document: serde_json::Value) -> PipelineResult<String> {
    let response: ChatCompletionResponse = serde_json::from_value(document)
        .map_err(|e| PipelineError::InvalidResponse(format!("Unexpected response shape: {}", e)))?;

    response.text().map(str::to_string).ok_or_else(|| {
        PipelineError::InvalidResponse("Response has no choices[0].message.content".to_string())
    })
}
