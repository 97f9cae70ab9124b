//! Error types for the handover core.
//!
//! Only configuration problems and unusable cycle input propagate as
//! [`HandoverError`]. Per-sample problems are [`SampleError`] values that the
//! calculators count and skip.

use serde::{Deserialize, Serialize};

/// Result type for handover operations
pub type HandoverResult<T> = Result<T, HandoverError>;

/// Error type for handover operations
#[derive(Debug, thiserror::Error)]
pub enum HandoverError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cycle input error: {0}")]
    CycleInput(String),

    #[error("Input error: {0}")]
    Input(String),
}

impl From<String> for HandoverError {
    fn from(s: String) -> Self {
        HandoverError::Configuration(s)
    }
}

impl From<&str> for HandoverError {
    fn from(s: &str) -> Self {
        HandoverError::Configuration(s.to_string())
    }
}

/// A single unusable sample. Never propagated, only counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum SampleError {
    #[error("sample has no timestamp")]
    MissingTimestamp,

    #[error("elevation is missing or not finite")]
    InvalidElevation,

    #[error("range is missing, not finite or not positive")]
    InvalidRange,

    #[error("timestamp does not advance past the previous sample")]
    NonMonotonicTime,

    #[error("no serving measurement at this timestamp")]
    MissingServingSample,

    #[error("signal sample is below the measurement floor")]
    InvalidSignal,
}
