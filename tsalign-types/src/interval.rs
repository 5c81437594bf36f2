use core::fmt;
use core::ops::{Add, Sub};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::TsError;

/// Convert a UTC date-time into fractional seconds since the Unix epoch.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn epoch_seconds(dt: DateTime<Utc>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9
}

/// Closed time interval `[lo, hi]` in seconds since the Unix epoch.
///
/// Bounds are sorted on construction, so `lo <= hi` always holds. Shifting
/// with `+`/`-` translates both bounds; a shifted copy is how callers test
/// half-open boundaries against a neighbouring window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct TimeInterval {
    lo: f64,
    hi: f64,
}

impl TimeInterval {
    /// Build an interval from two timestamps given in either order.
    ///
    /// # Errors
    /// Returns `Err(TsError::InvalidInterval)` if either bound is NaN.
    pub fn new(a: f64, b: f64) -> Result<Self, TsError> {
        if a.is_nan() || b.is_nan() {
            return Err(TsError::InvalidInterval(format!(
                "bounds must be orderable, got ({a}, {b})"
            )));
        }
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Ok(Self { lo, hi })
    }

    /// Build an interval from two UTC date-times given in either order.
    #[must_use]
    pub fn from_datetimes(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        let (a, b) = (epoch_seconds(a), epoch_seconds(b));
        // finite by construction
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// Degenerate interval covering a single instant.
    ///
    /// # Errors
    /// Returns `Err(TsError::InvalidInterval)` if `t` is NaN.
    pub fn point(t: f64) -> Result<Self, TsError> {
        Self::new(t, t)
    }

    /// Lower bound.
    #[must_use]
    pub const fn lo(&self) -> f64 {
        self.lo
    }

    /// Upper bound.
    #[must_use]
    pub const fn hi(&self) -> f64 {
        self.hi
    }

    /// Width `hi - lo`, never negative.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    /// `lo <= t <= hi`.
    #[must_use]
    pub fn contains(&self, t: f64) -> bool {
        self.lo <= t && t <= self.hi
    }

    /// `lo <= t < hi`, the membership test used for emitted collector windows.
    #[must_use]
    pub fn contains_half_open(&self, t: f64) -> bool {
        self.lo <= t && t < self.hi
    }

    /// Translate both bounds by `dt` seconds.
    #[must_use]
    pub fn shift(self, dt: f64) -> Self {
        Self {
            lo: self.lo + dt,
            hi: self.hi + dt,
        }
    }
}

impl Add<f64> for TimeInterval {
    type Output = Self;

    fn add(self, dt: f64) -> Self {
        self.shift(dt)
    }
}

impl Sub<f64> for TimeInterval {
    type Output = Self;

    fn sub(self, dt: f64) -> Self {
        self.shift(-dt)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

impl TryFrom<(f64, f64)> for TimeInterval {
    type Error = TsError;

    fn try_from((a, b): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(a, b)
    }
}

impl From<TimeInterval> for (f64, f64) {
    fn from(iv: TimeInterval) -> Self {
        (iv.lo, iv.hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_sorted_on_construction() {
        let iv = TimeInterval::new(5.0, 2.0).unwrap();
        assert_eq!((iv.lo(), iv.hi()), (2.0, 5.0));
        assert_eq!(iv.width(), 3.0);
    }

    #[test]
    fn nan_bound_is_rejected() {
        assert!(matches!(
            TimeInterval::new(f64::NAN, 1.0),
            Err(TsError::InvalidInterval(_))
        ));
    }

    #[test]
    fn shift_translates_both_bounds() {
        let iv = TimeInterval::new(0.0, 1.0).unwrap() + 2.5;
        assert_eq!((iv.lo(), iv.hi()), (2.5, 3.5));
        let back = iv - 2.5;
        assert_eq!((back.lo(), back.hi()), (0.0, 1.0));
    }

    #[test]
    fn half_open_excludes_upper_bound() {
        let iv = TimeInterval::new(0.0, 1.0).unwrap();
        assert!(iv.contains(1.0));
        assert!(!iv.contains_half_open(1.0));
        assert!(iv.contains_half_open(0.0));
    }

    #[test]
    fn datetimes_convert_to_epoch_seconds() {
        let a = DateTime::from_timestamp(10, 500_000_000).unwrap();
        let b = DateTime::from_timestamp(4, 0).unwrap();
        let iv = TimeInterval::from_datetimes(a, b);
        assert_eq!(iv.lo(), 4.0);
        assert!((iv.hi() - 10.5).abs() < 1e-9);
    }
}
