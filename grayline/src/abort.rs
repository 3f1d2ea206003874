//! Cooperative abort flag for background computations.
//!
//! Long-running pixel scans poll [`AbortFlag::is_raised`] once per row. The
//! requester only ever raises the flag; the task that notices it calls
//! [`AbortFlag::acknowledge`], which clears it. Each computation generation
//! gets its own flag, so a stale request never leaks into the next task.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A raise-once, clear-by-observer abort flag.
#[derive(Debug, Default)]
pub struct AbortFlag {
    raised: AtomicBool,
    acknowledged: AtomicUsize,
}

impl AbortFlag {
    /// Create a lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the computation stop.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Returns true if an abort has been requested and not yet acknowledged.
    #[inline]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Observe and clear a pending abort.
    ///
    /// Returns true if the flag was raised. Only one caller can win the
    /// clear, so concurrent observers never double-count.
    pub fn acknowledge(&self) -> bool {
        let was_raised = self
            .raised
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if was_raised {
            self.acknowledged.fetch_add(1, Ordering::Relaxed);
        }
        was_raised
    }

    /// Number of times an abort was observed and cleared.
    pub fn acknowledged_count(&self) -> usize {
        self.acknowledged.load(Ordering::Relaxed)
    }
}
