//! A [`Feedback`] that records what the core reports.

use std::cell::{Cell, RefCell};

use dggs_common::Feedback;

/// Records progress, messages and cancellation polls.
///
/// With [`RecordingFeedback::cancel_after`] it reports cancellation once it
/// has been polled the given number of times, which lets tests stop the
/// core at a precise point.
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    pub progress: RefCell<Vec<u8>>,
    pub infos: RefCell<Vec<String>>,
    pub errors: RefCell<Vec<String>>,
    polls: Cell<usize>,
    cancel_after: Option<usize>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report cancellation from the `polls`-th poll onwards (1-based).
    pub fn cancel_after(polls: usize) -> Self {
        Self {
            cancel_after: Some(polls),
            ..Self::default()
        }
    }

    /// Number of times `is_canceled` was called.
    pub fn polls(&self) -> usize {
        self.polls.get()
    }

    pub fn last_progress(&self) -> Option<u8> {
        self.progress.borrow().last().copied()
    }

    pub fn has_error_containing(&self, needle: &str) -> bool {
        self.errors.borrow().iter().any(|e| e.contains(needle))
    }
}

impl Feedback for RecordingFeedback {
    fn report_progress(&self, percent: u8) {
        self.progress.borrow_mut().push(percent);
    }

    fn report_info(&self, message: &str) {
        self.infos.borrow_mut().push(message.to_string());
    }

    fn report_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }

    fn is_canceled(&self) -> bool {
        let polls = self.polls.get() + 1;
        self.polls.set(polls);
        self.cancel_after.is_some_and(|limit| polls >= limit)
    }
}
