use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the tsalign workspace.
///
/// Covers malformed construction input, operations that have no defined
/// result on an empty series, and invalid caller arguments. Searches never
/// fail and strict interpolation outside the data range is not an error.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TsError {
    /// An interval could not be built from the given bounds (e.g. a NaN bound).
    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    /// A timestamp cannot be placed in chronological order (NaN).
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The operation needs at least one record to anchor its result.
    #[error("{op} requires a non-empty series")]
    EmptySeries {
        /// Operation label (e.g. "interpolate", "integrate").
        op: String,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A background task could not be scheduled or did not complete.
    #[error("background task failed: {0}")]
    Task(String),
}

impl TsError {
    /// Helper: build an `EmptySeries` error for an operation label.
    pub fn empty(op: impl Into<String>) -> Self {
        Self::EmptySeries { op: op.into() }
    }

    /// Helper: build an `InvalidArg` error from a message.
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }

    /// Helper: reject NaN timestamps, which have no place in a chronological order.
    ///
    /// # Errors
    /// Returns `Err(TsError::InvalidTimestamp)` if `ts` is NaN.
    pub fn check_timestamp(ts: f64) -> Result<f64, Self> {
        if ts.is_nan() {
            return Err(Self::InvalidTimestamp("NaN is not orderable".into()));
        }
        Ok(ts)
    }
}
