//! Error types for DGGS family operations.

use thiserror::Error;

use crate::family::DggsFamily;

/// Result type alias using DggsError.
pub type DggsResult<T> = Result<T, DggsError>;

/// Errors raised by family collaborators: decoding, metrics and generation.
#[derive(Debug, Error)]
pub enum DggsError {
    #[error("Unsupported DGGS family: {0}")]
    UnsupportedFamily(String),

    #[error("Invalid {family} identifier '{id}': {reason}")]
    Decode {
        family: DggsFamily,
        id: String,
        reason: String,
    },

    #[error("Resolution {resolution} is outside the valid range for {family}")]
    InvalidResolution { family: DggsFamily, resolution: i64 },

    #[error("Cell generation is not available for {0}")]
    GenerationUnavailable(DggsFamily),

    #[error("{family} grid at resolution {resolution} exceeds the limit of {limit} cells")]
    CellLimitExceeded {
        family: DggsFamily,
        resolution: u8,
        limit: usize,
    },

    #[error("Invalid extent: {0}")]
    InvalidExtent(String),
}

impl DggsError {
    /// Create a Decode error.
    pub fn decode(family: DggsFamily, id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            family,
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidResolution error.
    pub fn invalid_resolution(family: DggsFamily, resolution: impl Into<i64>) -> Self {
        Self::InvalidResolution {
            family,
            resolution: resolution.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_message_names_family_and_id() {
        let err = DggsError::decode(DggsFamily::Tilecode, "z5x1", "missing y component");
        let msg = err.to_string();
        assert!(msg.contains("tilecode"));
        assert!(msg.contains("z5x1"));
        assert!(msg.contains("missing y component"));
    }

    #[test]
    fn test_invalid_resolution_message() {
        let err = DggsError::invalid_resolution(DggsFamily::Olc, 3u8);
        assert_eq!(
            err.to_string(),
            "Resolution 3 is outside the valid range for olc"
        );
    }
}
