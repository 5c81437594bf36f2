use core::ops::{Bound, Deref, RangeBounds};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::timeseries::search::{first_after, latest_at_or_before};
use crate::{TimeRecord, TsError};

/// Growable sequence of records with non-decreasing timestamps.
///
/// The series owns its records and only exposes them through a shared slice
/// (`Deref<Target = [TimeRecord<T>]>`), so timestamps can never be edited in
/// place. Values may be mutated freely; a timestamp changes only through
/// [`TimeSeries::retime`], which re-inserts the record at its sorted position.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<T> {
    records: Vec<TimeRecord<T>>,
}

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimeSeries<T> {
    /// Empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Empty series with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Wrap records already known to be sorted.
    pub(crate) const fn from_sorted_unchecked(records: Vec<TimeRecord<T>>) -> Self {
        Self { records }
    }

    /// Build a series from records in any order.
    ///
    /// Sorting is stable, so records sharing a timestamp keep their input order.
    ///
    /// # Errors
    /// Returns `Err(TsError::InvalidTimestamp)` if any timestamp is NaN.
    pub fn from_records(mut records: Vec<TimeRecord<T>>) -> Result<Self, TsError> {
        for r in &records {
            TsError::check_timestamp(r.ts)?;
        }
        if !is_sorted(&records) {
            records.sort_by(TimeRecord::cmp_time);
        }
        Ok(Self { records })
    }

    /// Build a series from parallel timestamp and value collections, sorting them.
    ///
    /// # Errors
    /// - `Err(TsError::InvalidArg)` if the collections differ in length.
    /// - `Err(TsError::InvalidTimestamp)` if any timestamp is NaN.
    pub fn from_parts(timestamps: Vec<f64>, values: Vec<T>) -> Result<Self, TsError> {
        Self::from_records(zip_parts(timestamps, values)?)
    }

    /// Build a series from parallel collections the caller already ordered.
    ///
    /// # Errors
    /// - `Err(TsError::InvalidArg)` if the collections differ in length or the
    ///   timestamps decrease anywhere.
    /// - `Err(TsError::InvalidTimestamp)` if any timestamp is NaN.
    pub fn from_sorted_parts(timestamps: Vec<f64>, values: Vec<T>) -> Result<Self, TsError> {
        let records = zip_parts(timestamps, values)?;
        for r in &records {
            TsError::check_timestamp(r.ts)?;
        }
        if !is_sorted(&records) {
            return Err(TsError::invalid_arg("timestamps are not in ascending order"));
        }
        Ok(Self { records })
    }

    /// Borrow the records as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[TimeRecord<T>] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the series holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the series, returning its records in order.
    #[must_use]
    pub fn into_records(self) -> Vec<TimeRecord<T>> {
        self.records
    }

    /// Iterator over timestamps.
    pub fn timestamps(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.ts)
    }

    /// Iterator over values.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        self.records.iter().map(|r| &r.value)
    }

    /// Mutable iterator over values; timestamps stay untouched.
    pub fn values_mut(&mut self) -> impl ExactSizeIterator<Item = &mut T> + '_ {
        self.records.iter_mut().map(|r| &mut r.value)
    }

    /// Mutable access to the value at `index`.
    pub fn value_mut(&mut self, index: usize) -> Option<&mut T> {
        self.records.get_mut(index).map(|r| &mut r.value)
    }

    /// Replace the value at `index`, returning the previous one.
    ///
    /// # Errors
    /// Returns `Err(TsError::InvalidArg)` if `index` is out of range.
    pub fn set_value(&mut self, index: usize, value: T) -> Result<T, TsError> {
        let len = self.records.len();
        let slot = self
            .value_mut(index)
            .ok_or_else(|| TsError::invalid_arg(format!("index {index} out of range for length {len}")))?;
        Ok(core::mem::replace(slot, value))
    }

    /// Insert a record at its chronological position and return that index.
    ///
    /// A record whose timestamp ties existing ones lands after them, so arrival
    /// order is preserved among equal timestamps. Appending in order is O(1).
    ///
    /// # Errors
    /// Returns `Err(TsError::InvalidTimestamp)` if the timestamp is NaN.
    pub fn push(&mut self, record: TimeRecord<T>) -> Result<usize, TsError> {
        TsError::check_timestamp(record.ts)?;
        let at = match self.records.last() {
            None => 0,
            Some(last) if last.ts <= record.ts => self.records.len(),
            Some(_) => first_after(&self.records, record.ts),
        };
        self.records.insert(at, record);
        Ok(at)
    }

    /// Insert a record, trying `hint` as its position first.
    ///
    /// The hint is used only if inserting there keeps the series sorted;
    /// otherwise the position is searched as in [`TimeSeries::push`].
    ///
    /// # Errors
    /// Returns `Err(TsError::InvalidTimestamp)` if the timestamp is NaN.
    pub fn insert_with_hint(&mut self, record: TimeRecord<T>, hint: usize) -> Result<usize, TsError> {
        TsError::check_timestamp(record.ts)?;
        if self.fits_at(hint, record.ts, None) {
            self.records.insert(hint, record);
            return Ok(hint);
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(hint, ts = record.ts, "insert hint rejected; searching position");
        self.push(record)
    }

    /// Remove and return the record at `index`.
    pub fn remove(&mut self, index: usize) -> Option<TimeRecord<T>> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }

    /// Remove the records in `range`, returning them in order.
    ///
    /// # Errors
    /// Returns `Err(TsError::InvalidArg)` if the range is inverted or exceeds the length.
    pub fn drain_range<R: RangeBounds<usize>>(&mut self, range: R) -> Result<Vec<TimeRecord<T>>, TsError> {
        let (start, end) = self.resolve(&range)?;
        Ok(self.records.drain(start..end).collect())
    }

    /// Delete the records in `range`, returning how many were removed.
    ///
    /// # Errors
    /// Returns `Err(TsError::InvalidArg)` if the range is inverted or exceeds the length.
    pub fn delete_range<R: RangeBounds<usize>>(&mut self, range: R) -> Result<usize, TsError> {
        let (start, end) = self.resolve(&range)?;
        self.records.drain(start..end);
        Ok(end - start)
    }

    /// Change the timestamp of the record at `index`, returning its new index.
    ///
    /// The record stays where it is when the new timestamp still fits between
    /// its neighbours; otherwise it is removed and re-inserted using its old
    /// position as the hint.
    ///
    /// # Errors
    /// - `Err(TsError::InvalidArg)` if `index` is out of range.
    /// - `Err(TsError::InvalidTimestamp)` if `ts` is NaN.
    pub fn retime(&mut self, index: usize, ts: f64) -> Result<usize, TsError> {
        TsError::check_timestamp(ts)?;
        if index >= self.records.len() {
            return Err(TsError::invalid_arg(format!(
                "index {index} out of range for length {}",
                self.records.len()
            )));
        }
        if self.fits_at(index, ts, Some(index)) {
            self.records[index].ts = ts;
            return Ok(index);
        }
        let mut record = self.records.remove(index);
        record.ts = ts;
        self.insert_with_hint(record, index)
    }

    /// Drop all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Keep only the last record.
    pub fn keep_latest(&mut self) -> &mut Self {
        let n = self.records.len();
        if n > 1 {
            self.records.drain(..n - 1);
        }
        self
    }

    /// Discard history before `t`, keeping the latest record at or before `t`
    /// (or the first record, if none is) as the anchor for the current state.
    pub fn keep_latest_at(&mut self, t: f64) -> &mut Self {
        let start = latest_at_or_before(&self.records, t).unwrap_or(0);
        self.records.drain(..start);
        self
    }

    /// New series with the same timestamps and `f` applied to every value.
    #[must_use]
    pub fn map_values<U, F: FnMut(&T) -> U>(&self, mut f: F) -> TimeSeries<U> {
        TimeSeries::from_sorted_unchecked(
            self.records
                .iter()
                .map(|r| TimeRecord::new(r.ts, f(&r.value)))
                .collect(),
        )
    }

    /// New series with every value converted to `U`.
    #[must_use]
    pub fn convert_values<U: From<T>>(&self) -> TimeSeries<U>
    where
        T: Clone,
    {
        self.map_values(|v| U::from(v.clone()))
    }

    /// Replace every value with `f(value)` in place and return the series.
    pub fn map_values_in_place<F: FnMut(&T) -> T>(&mut self, mut f: F) -> &mut Self {
        for r in &mut self.records {
            r.value = f(&r.value);
        }
        self
    }

    /// Whether a record stamped `ts` may sit at `index` without breaking order,
    /// ignoring the record at `skip` (the one being moved, if any).
    fn fits_at(&self, index: usize, ts: f64, skip: Option<usize>) -> bool {
        let n = self.records.len();
        let (before, after) = match skip {
            Some(i) => (i.checked_sub(1), (i + 1 < n).then_some(i + 1)),
            None => (index.checked_sub(1), (index < n).then_some(index)),
        };
        if index > n {
            return false;
        }
        before.is_none_or(|b| self.records[b].ts <= ts) && after.is_none_or(|a| ts <= self.records[a].ts)
    }

    fn resolve<R: RangeBounds<usize>>(&self, range: &R) -> Result<(usize, usize), TsError> {
        let n = self.records.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => n,
        };
        if start > end || end > n {
            return Err(TsError::invalid_arg(format!(
                "range {start}..{end} invalid for length {n}"
            )));
        }
        Ok((start, end))
    }
}

fn zip_parts<T>(timestamps: Vec<f64>, values: Vec<T>) -> Result<Vec<TimeRecord<T>>, TsError> {
    if timestamps.len() != values.len() {
        return Err(TsError::invalid_arg(format!(
            "{} timestamps but {} values",
            timestamps.len(),
            values.len()
        )));
    }
    Ok(timestamps
        .into_iter()
        .zip(values)
        .map(|(ts, v)| TimeRecord::new(ts, v))
        .collect())
}

fn is_sorted<T>(records: &[TimeRecord<T>]) -> bool {
    records.windows(2).all(|w| w[0].ts <= w[1].ts)
}

impl<T> Deref for TimeSeries<T> {
    type Target = [TimeRecord<T>];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl<T> AsRef<[TimeRecord<T>]> for TimeSeries<T> {
    fn as_ref(&self) -> &[TimeRecord<T>] {
        &self.records
    }
}

impl<T> IntoIterator for TimeSeries<T> {
    type Item = TimeRecord<T>;
    type IntoIter = std::vec::IntoIter<TimeRecord<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a TimeSeries<T> {
    type Item = &'a TimeRecord<T>;
    type IntoIter = core::slice::Iter<'a, TimeRecord<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<T> TryFrom<Vec<TimeRecord<T>>> for TimeSeries<T> {
    type Error = TsError;

    fn try_from(records: Vec<TimeRecord<T>>) -> Result<Self, Self::Error> {
        Self::from_records(records)
    }
}

impl<T: Serialize> Serialize for TimeSeries<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for TimeSeries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = Vec::<TimeRecord<T>>::deserialize(deserializer)?;
        Self::from_records(records).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(ts: &[f64]) -> TimeSeries<usize> {
        TimeSeries::from_sorted_parts(ts.to_vec(), (0..ts.len()).collect()).unwrap()
    }

    #[test]
    fn from_parts_sorts_stably() {
        let ts = TimeSeries::from_parts(vec![3.0, 1.0, 2.0, 1.0], vec!['c', 'a', 'b', 'z']).unwrap();
        assert_eq!(ts.timestamps().collect::<Vec<_>>(), vec![1.0, 1.0, 2.0, 3.0]);
        assert_eq!(ts.values().copied().collect::<String>(), "azbc");
    }

    #[test]
    fn length_helpers_work_as_function_paths() {
        let all = [series(&[1.0, 2.0]), TimeSeries::new(), series(&[3.0])];
        assert_eq!(all.iter().map(TimeSeries::len).sum::<usize>(), 3);
        assert_eq!(all.iter().filter(|s| TimeSeries::is_empty(s)).count(), 1);
    }

    #[test]
    fn from_parts_rejects_mismatched_lengths() {
        let err = TimeSeries::from_parts(vec![1.0, 2.0], vec![1]).unwrap_err();
        assert!(matches!(err, TsError::InvalidArg(_)));
    }

    #[test]
    fn from_sorted_parts_rejects_unsorted_input() {
        assert!(TimeSeries::from_sorted_parts(vec![2.0, 1.0], vec![0, 1]).is_err());
    }

    #[test]
    fn push_keeps_order_and_appends_after_ties() {
        let mut ts = series(&[1.0, 2.0, 4.0]);
        assert_eq!(ts.push(TimeRecord::new(3.0, 10)).unwrap(), 2);
        assert_eq!(ts.push(TimeRecord::new(2.0, 11)).unwrap(), 2);
        assert_eq!(ts.push(TimeRecord::new(9.0, 12)).unwrap(), 5);
        assert_eq!(ts.push(TimeRecord::new(0.0, 13)).unwrap(), 0);
        assert_eq!(
            ts.timestamps().collect::<Vec<_>>(),
            vec![0.0, 1.0, 2.0, 2.0, 3.0, 4.0, 9.0]
        );
        assert_eq!(ts[3].value, 11);
    }

    #[test]
    fn push_rejects_nan() {
        let mut ts = series(&[1.0]);
        assert!(matches!(
            ts.push(TimeRecord::new(f64::NAN, 0)),
            Err(TsError::InvalidTimestamp(_))
        ));
        assert_eq!(ts.len(), 1);
    }

    #[test]
    fn wrong_hint_still_inserts_in_order() {
        let mut ts = series(&[1.0, 2.0, 3.0]);
        assert_eq!(ts.insert_with_hint(TimeRecord::new(2.5, 9), 0).unwrap(), 2);
        assert_eq!(ts.insert_with_hint(TimeRecord::new(0.5, 8), 0).unwrap(), 0);
        assert_eq!(ts.insert_with_hint(TimeRecord::new(7.0, 7), 99).unwrap(), 5);
        assert_eq!(
            ts.timestamps().collect::<Vec<_>>(),
            vec![0.5, 1.0, 2.0, 2.5, 3.0, 7.0]
        );
    }

    #[test]
    fn retime_in_place_and_with_move() {
        let mut ts = series(&[1.0, 2.0, 3.0]);
        assert_eq!(ts.retime(1, 2.5).unwrap(), 1);
        assert_eq!(ts.retime(1, 5.0).unwrap(), 2);
        assert_eq!(ts.timestamps().collect::<Vec<_>>(), vec![1.0, 3.0, 5.0]);
        assert_eq!(ts.values().copied().collect::<Vec<_>>(), vec![0, 2, 1]);
        assert!(ts.retime(7, 1.0).is_err());
    }

    #[test]
    fn delete_and_drain_ranges() {
        let mut ts = series(&[1.0, 2.0, 3.0, 4.0]);
        let drained = ts.drain_range(1..3).unwrap();
        assert_eq!(drained.len(), 2);
        assert_eq!(ts.timestamps().collect::<Vec<_>>(), vec![1.0, 4.0]);
        assert_eq!(ts.delete_range(..).unwrap(), 2);
        assert!(ts.is_empty());
        assert!(ts.delete_range(0..1).is_err());
    }

    #[test]
    fn value_edits_do_not_touch_timestamps() {
        let mut ts = series(&[1.0, 2.0]);
        assert_eq!(ts.set_value(1, 40).unwrap(), 1);
        *ts.value_mut(0).unwrap() = 30;
        ts.map_values_in_place(|v| v + 1);
        assert_eq!(ts.values().copied().collect::<Vec<_>>(), vec![31, 41]);
        assert!(ts.set_value(5, 0).is_err());
    }

    #[test]
    fn keep_latest_variants() {
        let mut ts = series(&[1.0, 2.0, 3.0, 4.0]);
        ts.keep_latest_at(2.5);
        assert_eq!(ts.timestamps().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
        ts.keep_latest_at(0.0);
        assert_eq!(ts.len(), 3);
        ts.keep_latest();
        assert_eq!(ts.timestamps().collect::<Vec<_>>(), vec![4.0]);

        let mut empty: TimeSeries<usize> = TimeSeries::new();
        empty.keep_latest().keep_latest_at(1.0);
        assert!(empty.is_empty());
    }

    #[test]
    fn map_and_convert_keep_timestamps() {
        let ts = TimeSeries::from_sorted_parts(vec![1.0, 2.0], vec![1_i32, 2]).unwrap();
        let doubled = ts.map_values(|v| v * 2);
        assert_eq!(doubled.values().copied().collect::<Vec<_>>(), vec![2, 4]);
        let as_f64: TimeSeries<f64> = ts.convert_values();
        assert_eq!(as_f64.timestamps().collect::<Vec<_>>(), vec![1.0, 2.0]);
        assert_eq!(as_f64[1].value, 2.0);
    }

    #[test]
    fn serde_roundtrip_sorts_input() {
        let json = r#"[{"ts":2.0,"value":1},{"ts":1.0,"value":0}]"#;
        let ts: TimeSeries<i32> = serde_json::from_str(json).unwrap();
        assert_eq!(ts.timestamps().collect::<Vec<_>>(), vec![1.0, 2.0]);
        let back = serde_json::to_string(&ts).unwrap();
        assert_eq!(back, r#"[{"ts":1.0,"value":0},{"ts":2.0,"value":1}]"#);
    }
}
