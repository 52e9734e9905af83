//! Exchange latency measurement

use tokio::time::Instant;

/// Monotonic stopwatch reporting fractional milliseconds.
///
/// Backed by `tokio::time::Instant`, so it never observes wall-clock
/// adjustments and follows the paused clock in tests.
#[derive(Debug, Clone, Copy)]
pub struct LatencyTimer {
    started: Instant,
}

impl LatencyTimer {
    /// Start timing now
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Milliseconds since [`LatencyTimer::start`]
    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}
