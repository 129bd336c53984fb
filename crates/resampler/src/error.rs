//! Error types for resampling runs.

use thiserror::Error;

use dggs_common::{DggsError, DggsFamily};

/// Errors that abort a resampling run.
///
/// Cancellation is not among them: a canceled run returns its partial
/// output normally.
#[derive(Error, Debug)]
pub enum ResampleError {
    /// A family collaborator failed (unknown family, bad identifier,
    /// resolution out of range, cell limit).
    #[error(transparent)]
    Dggs(#[from] DggsError),

    /// The requested attribute is absent from a source feature.
    #[error("field '{field}' is missing on source feature {index}")]
    MissingField { field: String, index: usize },

    /// An intersecting source feature carries a non-numeric value.
    #[error("field '{field}' on source feature {index} is not numeric ({kind}: {value})")]
    NonNumericValue {
        field: String,
        index: usize,
        kind: &'static str,
        value: String,
    },

    /// The target family has no valid resolutions to choose from.
    #[error("no valid resolution found for {0}")]
    NoResolutionFound(DggsFamily),

    /// The source layer has no features.
    #[error("source layer has no features")]
    EmptyInput,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ResampleError {
    /// Create a MissingField error.
    pub fn missing_field(field: impl Into<String>, index: usize) -> Self {
        Self::MissingField {
            field: field.into(),
            index,
        }
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type for resampling operations.
pub type Result<T> = std::result::Result<T, ResampleError>;
