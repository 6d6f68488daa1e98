//! Cooperative fail-fast token shared by every fetch task of one job.
//!
//! Tasks read the flag before they start; the first task to exhaust its
//! retry budget trips it. Nothing already in flight is interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-way job failure flag. Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct FailFlag {
    tripped: Arc<AtomicBool>,
}

impl FailFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Returns `true` only for the caller that actually flipped
    /// it, so exactly one failure is reported per job.
    pub fn trip(&self) -> bool {
        self.tripped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }
}
