//! Single-flight guard for a pipeline surface

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// At most one holder at a time. Shared by clones of a pipeline.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExchangeSlot {
    busy: Arc<AtomicBool>,
}

impl ExchangeSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Claim the slot, or `None` when an exchange already holds it
    pub(crate) fn try_acquire(&self) -> Option<SlotGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SlotGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub(crate) fn is_held(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the slot on drop
#[derive(Debug)]
pub(crate) struct SlotGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
