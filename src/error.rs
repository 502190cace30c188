//! Error types for Synheart Stride

use crate::types::TrackingMode;
use thiserror::Error;

/// Errors that can occur while building a tracker or parsing its inputs.
///
/// Once a [`SegmentTracker`](crate::tracker::SegmentTracker) exists, none of its
/// operations fail: bad samples are clamped instead.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Invalid workout definition: {0}")]
    InvalidDefinition(String),

    #[error("Tracking mode mismatch: requested {expected}, definition is {found}")]
    ModeMismatch {
        expected: TrackingMode,
        found: TrackingMode,
    },

    #[error("Invalid tracker state: {0}")]
    InvalidState(String),

    #[error("Failed to parse payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
