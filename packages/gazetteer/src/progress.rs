//! Progress reporting for one-shot loading and index construction.
//!
//! Callers hand a [`ProgressCallback`] into the long-running step they
//! start; nothing in the gazetteer or the engine holds a process-wide
//! tracker. Rendering (progress bars, log lines, silence) is chosen by
//! the caller.

use std::sync::atomic::{AtomicU64, Ordering};

/// Receiver of progress updates from a long-running step.
///
/// Implementations must be `Send + Sync` so a single reporter can be
/// shared across threads.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected units of work.
    fn set_total(&self, total: u64);

    /// Set the current position (absolute, not delta).
    fn set_position(&self, pos: u64);

    /// Advance progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Describe the phase currently running.
    fn set_message(&self, msg: String);

    /// Mark the step as complete with a final message.
    fn finish(&self, msg: String);

    /// Mark the step as complete and remove any indicator.
    fn finish_and_clear(&self);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn set_position(&self, _pos: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Forwards phase changes and completion to the `log` facade at debug
/// level. Position updates are counted but not logged.
#[derive(Default)]
pub struct LogProgress {
    total: AtomicU64,
    position: AtomicU64,
}

impl LogProgress {
    /// Current position.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }

    /// Last total announced.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl ProgressCallback for LogProgress {
    fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        self.position.store(0, Ordering::Relaxed);
    }

    fn set_position(&self, pos: u64) {
        self.position.store(pos, Ordering::Relaxed);
    }

    fn inc(&self, delta: u64) {
        self.position.fetch_add(delta, Ordering::Relaxed);
    }

    fn set_message(&self, msg: String) {
        log::debug!("{msg}");
    }

    fn finish(&self, msg: String) {
        self.position.store(self.total(), Ordering::Relaxed);
        log::debug!("{msg}");
    }

    fn finish_and_clear(&self) {
        self.position.store(self.total(), Ordering::Relaxed);
    }
}
