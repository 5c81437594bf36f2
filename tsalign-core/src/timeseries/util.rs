//! Shared argument checks for the series algorithms.

use crate::{TimeRecord, TsError};

/// Ensure the series has at least one record to anchor a result.
///
/// # Errors
/// Returns `Err(TsError::EmptySeries)` naming `op` if `records` is empty.
pub fn ensure_non_empty<T>(records: &[TimeRecord<T>], op: &str) -> Result<(), TsError> {
    if records.is_empty() {
        return Err(TsError::empty(op));
    }
    Ok(())
}

/// Ensure caller-supplied query timestamps are orderable and non-decreasing.
///
/// # Errors
/// - `Err(TsError::InvalidTimestamp)` if any timestamp is NaN.
/// - `Err(TsError::InvalidArg)` if a timestamp is smaller than its predecessor.
pub fn ensure_ascending(times: &[f64], op: &str) -> Result<(), TsError> {
    for &t in times {
        TsError::check_timestamp(t)?;
    }
    if let Some(i) = times.windows(2).position(|w| w[1] < w[0]) {
        return Err(TsError::invalid_arg(format!(
            "{op}: query timestamps must be ascending ({} follows {})",
            times[i + 1],
            times[i]
        )));
    }
    Ok(())
}
