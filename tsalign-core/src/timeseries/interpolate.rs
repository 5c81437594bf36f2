use super::search::first_after;
use super::util::ensure_non_empty;
use crate::{InterpOrder, Linear, TimeRecord, TimeSeries, TsError};

/// Zero-order hold given `upper`, the index of the first record later than the
/// query time. Before the first record the first value is held.
fn hold_with_upper<T>(records: &[TimeRecord<T>], upper: usize) -> &T {
    &records[upper.saturating_sub(1)].value
}

/// Linear estimate given `upper`, the index of the first record later than `t`.
/// Saturates to the endpoint values outside the series range. `records` must
/// be non-empty.
pub(crate) fn linear_with_upper<T: Linear>(records: &[TimeRecord<T>], upper: usize, t: f64) -> T {
    if upper == 0 {
        return records[0].value.clone();
    }
    let a = &records[upper - 1];
    if upper == records.len() || a.ts == t {
        return a.value.clone();
    }
    let b = &records[upper];
    // a.ts <= t < b.ts, so the span is positive
    let w = (t - a.ts) / (b.ts - a.ts);
    a.value.clone() * (1.0 - w) + b.value.clone() * w
}

/// Order-dispatching estimate given `upper`. `records` must be non-empty.
pub(crate) fn estimate_with_upper<T: Linear>(
    records: &[TimeRecord<T>],
    upper: usize,
    t: f64,
    order: InterpOrder,
) -> T {
    match order {
        InterpOrder::Hold => hold_with_upper(records, upper).clone(),
        InterpOrder::Linear => linear_with_upper(records, upper, t),
    }
}

/// Value of the latest record at or before `t`.
///
/// Before the first record the first value is returned, after the last record
/// the last one. Needs nothing from the value type, so it also serves
/// categorical or opaque values.
///
/// # Errors
/// - `Err(TsError::EmptySeries)` if `records` is empty.
/// - `Err(TsError::InvalidTimestamp)` if `t` is NaN.
pub fn hold_at<T>(records: &[TimeRecord<T>], t: f64) -> Result<&T, TsError> {
    ensure_non_empty(records, "interpolate")?;
    TsError::check_timestamp(t)?;
    Ok(hold_with_upper(records, first_after(records, t)))
}

/// Linear interpolation between the records bracketing `t`, flat outside the range.
///
/// # Errors
/// - `Err(TsError::EmptySeries)` if `records` is empty.
/// - `Err(TsError::InvalidTimestamp)` if `t` is NaN.
pub fn linear_at<T: Linear>(records: &[TimeRecord<T>], t: f64) -> Result<T, TsError> {
    ensure_non_empty(records, "interpolate")?;
    TsError::check_timestamp(t)?;
    Ok(linear_with_upper(records, first_after(records, t), t))
}

/// Estimate the value at `t` with the given interpolation order.
///
/// Outside the series range the nearest endpoint value is returned. At a
/// record's own timestamp the result is that record's value (the last one,
/// when several records share the timestamp).
///
/// ```
/// use tsalign_core::{InterpOrder, TimeSeries, interpolate};
///
/// let ts = TimeSeries::from_sorted_parts(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]).unwrap();
/// assert_eq!(interpolate(&ts, 1.5, InterpOrder::Hold).unwrap(), 1.0);
/// assert_eq!(interpolate(&ts, 1.5, InterpOrder::Linear).unwrap(), 1.5);
/// assert_eq!(interpolate(&ts, 9.0, InterpOrder::Linear).unwrap(), 3.0);
/// ```
///
/// # Errors
/// - `Err(TsError::EmptySeries)` if `records` is empty.
/// - `Err(TsError::InvalidTimestamp)` if `t` is NaN.
pub fn interpolate<T: Linear>(
    records: &[TimeRecord<T>],
    t: f64,
    order: InterpOrder,
) -> Result<T, TsError> {
    ensure_non_empty(records, "interpolate")?;
    TsError::check_timestamp(t)?;
    Ok(estimate_with_upper(records, first_after(records, t), t, order))
}

/// Estimate values at each query time, returned as a series keyed by those times.
///
/// # Errors
/// - `Err(TsError::EmptySeries)` if `records` is empty.
/// - `Err(TsError::InvalidTimestamp)` if a query time is NaN.
pub fn interpolate_many<T: Linear>(
    records: &[TimeRecord<T>],
    times: &[f64],
    order: InterpOrder,
) -> Result<TimeSeries<T>, TsError> {
    ensure_non_empty(records, "interpolate")?;
    TimeSeries::from_records(
        times
            .iter()
            .map(|&t| TimeRecord::new(t, estimate_with_upper(records, first_after(records, t), t, order)))
            .collect(),
    )
}

/// Zero-order hold at each query time, for value types without arithmetic.
///
/// # Errors
/// - `Err(TsError::EmptySeries)` if `records` is empty.
/// - `Err(TsError::InvalidTimestamp)` if a query time is NaN.
pub fn hold_many<T: Clone>(records: &[TimeRecord<T>], times: &[f64]) -> Result<TimeSeries<T>, TsError> {
    ensure_non_empty(records, "interpolate")?;
    TimeSeries::from_records(
        times
            .iter()
            .map(|&t| TimeRecord::new(t, hold_with_upper(records, first_after(records, t)).clone()))
            .collect(),
    )
}

/// Like [`interpolate`], but `None` when `t` lies outside `[first.ts, last.ts]`.
///
/// An empty series has no range, so every query yields `None`.
#[must_use]
pub fn strict_interpolate<T: Linear>(
    records: &[TimeRecord<T>],
    t: f64,
    order: InterpOrder,
) -> Option<T> {
    let (first, last) = (records.first()?, records.last()?);
    if !(first.ts <= t && t <= last.ts) {
        return None;
    }
    Some(estimate_with_upper(records, first_after(records, t), t, order))
}

/// [`strict_interpolate`] at each query time.
///
/// # Errors
/// Returns `Err(TsError::InvalidTimestamp)` if a query time is NaN.
pub fn strict_interpolate_many<T: Linear>(
    records: &[TimeRecord<T>],
    times: &[f64],
    order: InterpOrder,
) -> Result<TimeSeries<Option<T>>, TsError> {
    TimeSeries::from_records(
        times
            .iter()
            .map(|&t| TimeRecord::new(t, strict_interpolate(records, t, order)))
            .collect(),
    )
}
