//! Interval-bounded range queries over sorted record slices.
//!
//! Every bound is a monotone predicate over the sorted timestamps and is found
//! with `partition_point`, so each query is logarithmic in the series length.
//! Ranges are half-open index ranges; an empty result is `a..a`.

use core::ops::Range;

use crate::{TimeInterval, TimeRecord, TimeSeries};

/// Index of the first record with `ts >= t` (`len` if none).
pub(crate) fn first_at_or_after<T>(records: &[TimeRecord<T>], t: f64) -> usize {
    records.partition_point(|r| r.ts < t)
}

/// Index of the first record with `ts > t` (`len` if none).
pub(crate) fn first_after<T>(records: &[TimeRecord<T>], t: f64) -> usize {
    records.partition_point(|r| r.ts <= t)
}

/// Index of the last record with `ts <= t`, or `None` if every record is later.
#[must_use]
pub fn latest_at_or_before<T>(records: &[TimeRecord<T>], t: f64) -> Option<usize> {
    first_after(records, t).checked_sub(1)
}

/// Records lying inside the closed interval: `lo <= ts <= hi`.
///
/// Never fails; an interval that misses every record yields an empty range
/// positioned where such records would be inserted.
///
/// ```
/// use tsalign_core::{TimeInterval, TimeSeries, find_inner};
///
/// let ts = TimeSeries::from_sorted_parts(vec![1.0, 2.0, 3.0, 4.0], vec![0; 4]).unwrap();
/// assert_eq!(find_inner(&ts, &TimeInterval::new(1.5, 3.0).unwrap()), 1..3);
/// assert!(find_inner(&ts, &TimeInterval::new(2.2, 2.8).unwrap()).is_empty());
/// ```
#[must_use]
pub fn find_inner<T>(records: &[TimeRecord<T>], interval: &TimeInterval) -> Range<usize> {
    let a = first_at_or_after(records, interval.lo());
    let b = first_after(records, interval.hi());
    // lo <= hi keeps a <= b
    a..b
}

/// Smallest range bracketing the interval with one extra record on each side
/// when one exists.
///
/// The start is the last record at or before `lo` (the first record if none
/// is), the end the first record at or after `hi` (the last record if none
/// is), widened when needed so the range always covers [`find_inner`].
/// Non-empty for every non-empty series.
///
/// ```
/// use tsalign_core::{TimeInterval, TimeSeries, find_outer};
///
/// let ts = TimeSeries::from_sorted_parts(vec![1.0, 2.0, 3.0, 4.0], vec![0; 4]).unwrap();
/// assert_eq!(find_outer(&ts, &TimeInterval::new(1.5, 2.5).unwrap()), 0..3);
/// assert_eq!(find_outer(&ts, &TimeInterval::new(-3.0, -1.0).unwrap()), 0..1);
/// assert_eq!(find_outer(&ts, &TimeInterval::new(8.0, 9.0).unwrap()), 3..4);
/// ```
#[must_use]
pub fn find_outer<T>(records: &[TimeRecord<T>], interval: &TimeInterval) -> Range<usize> {
    let n = records.len();
    if n == 0 {
        return 0..0;
    }
    let inner = find_inner(records, interval);
    // ties at a bound sit inside the inner range; the outer range must still cover them
    let a = latest_at_or_before(records, interval.lo())
        .unwrap_or(0)
        .min(inner.start);
    let b = first_at_or_after(records, interval.hi()).min(n - 1);
    a..(b + 1).max(inner.end)
}

/// Borrowed window over the records inside the interval.
#[must_use]
pub fn view_inner<'a, T>(records: &'a [TimeRecord<T>], interval: &TimeInterval) -> &'a [TimeRecord<T>] {
    &records[find_inner(records, interval)]
}

/// Borrowed window over the records bracketing the interval.
#[must_use]
pub fn view_outer<'a, T>(records: &'a [TimeRecord<T>], interval: &TimeInterval) -> &'a [TimeRecord<T>] {
    &records[find_outer(records, interval)]
}

/// Owned copy of the records inside the interval.
#[must_use]
pub fn get_inner<T: Clone>(records: &[TimeRecord<T>], interval: &TimeInterval) -> TimeSeries<T> {
    TimeSeries::from_sorted_unchecked(view_inner(records, interval).to_vec())
}

/// Owned copy of the records bracketing the interval.
#[must_use]
pub fn get_outer<T: Clone>(records: &[TimeRecord<T>], interval: &TimeInterval) -> TimeSeries<T> {
    TimeSeries::from_sorted_unchecked(view_outer(records, interval).to_vec())
}
