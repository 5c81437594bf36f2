use core::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::epoch_seconds;

/// A single timestamped observation.
///
/// Records are ordered by `ts` alone (see [`TimeRecord::cmp_time`]); records
/// with equal timestamps are kept side by side, never deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRecord<T> {
    /// Seconds since the Unix epoch.
    pub ts: f64,
    /// Observed value.
    pub value: T,
}

impl<T> TimeRecord<T> {
    /// Build a record from a timestamp in seconds and a value.
    pub const fn new(ts: f64, value: T) -> Self {
        Self { ts, value }
    }

    /// Build a record stamped with a UTC date-time.
    pub fn from_datetime(at: DateTime<Utc>, value: T) -> Self {
        Self::new(epoch_seconds(at), value)
    }

    /// Chronological comparison; values do not participate.
    #[must_use]
    pub fn cmp_time(&self, other: &Self) -> Ordering {
        self.ts.total_cmp(&other.ts)
    }

    /// Transform the value, keeping the timestamp.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> TimeRecord<U> {
        TimeRecord {
            ts: self.ts,
            value: f(self.value),
        }
    }

    /// Split into `(ts, value)`.
    pub fn into_parts(self) -> (f64, T) {
        (self.ts, self.value)
    }
}

impl<T> From<(f64, T)> for TimeRecord<T> {
    fn from((ts, value): (f64, T)) -> Self {
        Self::new(ts, value)
    }
}
