//! Cooperative progress reporting and cancellation.
//!
//! Every multi-pixel operation takes a `&dyn Progress`. Implementations use
//! interior mutability so one handle can be shared by parallel workers.
//! Observing a cancellation request makes the operation return
//! [`DiffMatchError::Cancelled`](crate::DiffMatchError::Cancelled); the
//! partially built output must be discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Progress/cancellation handle for long-running operations.
pub trait Progress: Sync {
    /// Reports that `done` of `total` work units are complete.
    fn report(&self, done: usize, total: usize);

    /// Returns true if the caller requested cancellation.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Progress handle that ignores reports and never cancels.
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&self, _done: usize, _total: usize) {}
}

/// Shareable cancellation flag.
///
/// Clones observe the same flag, so one clone can be handed to the worker
/// while another is used to request cancellation.
#[derive(Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; observed at the next per-row check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl Progress for CancelFlag {
    fn report(&self, _done: usize, _total: usize) {}

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Forwards cancellation but swallows reports.
///
/// The matcher owns the run-wide progress scale; inner per-row operations
/// get this wrapper so their per-pixel reports do not interleave with the
/// run's row accounting.
pub(crate) struct CancelOnly<'p>(pub &'p dyn Progress);

impl Progress for CancelOnly<'_> {
    fn report(&self, _done: usize, _total: usize) {}

    fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}
