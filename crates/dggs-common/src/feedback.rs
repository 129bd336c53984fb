//! Progress, diagnostics and cooperative cancellation.
//!
//! The resampling core pushes progress and messages through [`Feedback`] and
//! polls [`Feedback::is_canceled`] at well-defined points: once per target
//! cell in the overlay loop and once per generated cell during grid
//! generation. Cancellation is never an error; callers receive whatever
//! has been produced so far.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// Channel between the resampling core and its caller.
pub trait Feedback {
    /// Percent complete of the current stage (0-100).
    fn report_progress(&self, percent: u8);

    fn report_info(&self, message: &str);

    fn report_error(&self, message: &str);

    fn is_canceled(&self) -> bool;
}

/// Feedback that discards everything and never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFeedback;

impl Feedback for NoopFeedback {
    fn report_progress(&self, _percent: u8) {}

    fn report_info(&self, _message: &str) {}

    fn report_error(&self, _message: &str) {}

    fn is_canceled(&self) -> bool {
        false
    }
}

/// Shared cancellation flag, cheap to clone into signal handlers.
#[derive(Debug, Default, Clone)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Feedback that forwards to `tracing` and observes a [`CancellationFlag`].
#[derive(Debug, Default, Clone)]
pub struct TracingFeedback {
    cancel: CancellationFlag,
}

impl TracingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancel: CancellationFlag) -> Self {
        Self { cancel }
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancel
    }
}

impl Feedback for TracingFeedback {
    fn report_progress(&self, percent: u8) {
        tracing::debug!(percent, "progress");
    }

    fn report_info(&self, message: &str) {
        info!("{}", message);
    }

    fn report_error(&self, message: &str) {
        error!("{}", message);
    }

    fn is_canceled(&self) -> bool {
        self.cancel.is_canceled()
    }
}
