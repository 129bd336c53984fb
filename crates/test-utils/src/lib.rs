//! Shared test utilities for the dggs-resample workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Fixture extents and points
//! - Source layer generators (squares, partitions, valued grids)
//! - A [`Feedback`](dggs_common::Feedback) implementation that records
//!   everything it is told and cancels on demand
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, square_feature, RecordingFeedback};
//! ```

pub mod feedback;
pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use feedback::*;
pub use fixtures::*;
pub use generators::*;

/// Assert two floats are within `tolerance` of each other.
#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let (left, right, tolerance): (f64, f64, f64) = ($left, $right, $tolerance);
        assert!(
            (left - right).abs() <= tolerance,
            "assertion failed: |{} - {}| <= {}",
            left,
            right,
            tolerance
        );
    }};
    ($left:expr, $right:expr) => {
        $crate::assert_close!($left, $right, 1e-9)
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_close_macro() {
        assert_close!(1.0, 1.0 + 1e-12);
        assert_close!(100.0, 100.4, 0.5);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_close_macro_fails() {
        assert_close!(1.0, 2.0, 0.5);
    }
}
