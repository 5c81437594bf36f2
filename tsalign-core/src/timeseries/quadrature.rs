use super::interpolate::{estimate_with_upper, linear_with_upper};
use super::search::first_after;
use super::util::{ensure_ascending, ensure_non_empty};
use crate::{InterpOrder, Integrable, TimeInterval, TimeRecord, TimeSeries, TsError};

/// Integral over `[lo, hi]` plus the index of the first record after `lo`,
/// which is a valid hint for any later interval starting at or after `lo`.
///
/// The hint is trusted only if the record before it is at or before `lo`;
/// otherwise the start is searched over the whole slice. `records` must be
/// non-empty.
fn segment<T: Integrable>(
    records: &[TimeRecord<T>],
    lo: f64,
    hi: f64,
    order: InterpOrder,
    hint: Option<usize>,
) -> (T, usize) {
    let n = records.len();
    let start = match hint {
        Some(h) if h <= n && (h == 0 || records[h - 1].ts <= lo) => {
            h + first_after(&records[h..], lo)
        }
        _ => {
            #[cfg(feature = "tracing")]
            if let Some(h) = hint {
                tracing::trace!(hint = h, lo, "integral hint rejected; searching full series");
            }
            first_after(records, lo)
        }
    };
    // breakpoints strictly after lo, up to and including hi
    let end = start + first_after(&records[start..], hi);
    let interior = &records[start..end];

    let mut acc = T::zero();
    let mut t_prev = lo;
    match order {
        InterpOrder::Hold => {
            let mut v_prev = &records[start.saturating_sub(1)].value;
            for r in interior {
                acc = acc + v_prev.clone() * (r.ts - t_prev);
                t_prev = r.ts;
                v_prev = &r.value;
            }
            acc = acc + v_prev.clone() * (hi - t_prev);
        }
        InterpOrder::Linear => {
            let mut v_prev = linear_with_upper(records, start, lo);
            for r in interior {
                acc = acc + (v_prev + r.value.clone()) * (0.5 * (r.ts - t_prev));
                t_prev = r.ts;
                v_prev = r.value.clone();
            }
            let v_hi = linear_with_upper(records, end, hi);
            acc = acc + (v_prev + v_hi) * (0.5 * (hi - t_prev));
        }
    }
    (acc, start)
}

/// Definite integral of the interpolant over one interval.
///
/// `hint` may carry a record index from a previous call over an earlier
/// interval to shrink the search; any hint, valid or not, yields the same
/// result. Outside the series range the interpolant is flat.
///
/// # Errors
/// Returns `Err(TsError::EmptySeries)` if `records` is empty.
pub fn integral<T: Integrable>(
    records: &[TimeRecord<T>],
    interval: &TimeInterval,
    order: InterpOrder,
    hint: Option<usize>,
) -> Result<T, TsError> {
    ensure_non_empty(records, "integral")?;
    Ok(segment(records, interval.lo(), interval.hi(), order, hint).0)
}

/// Integrals over each consecutive pair of query times; `m` times give `m - 1` results.
///
/// ```
/// use tsalign_core::{InterpOrder, TimeSeries, integrate};
///
/// let ts = TimeSeries::from_sorted_parts(
///     vec![1.0, 2.0, 3.0, 4.0, 5.0],
///     vec![1.0, 2.0, 3.0, 4.0, 5.0],
/// ).unwrap();
/// let out = integrate(&ts, &[1.5, 2.5, 3.5], InterpOrder::Linear).unwrap();
/// assert_eq!(out, vec![2.0, 3.0]);
/// ```
///
/// # Errors
/// - `Err(TsError::EmptySeries)` if `records` is empty.
/// - `Err(TsError::InvalidArg)` / `Err(TsError::InvalidTimestamp)` if the query
///   times are not ascending or contain NaN.
pub fn integrate<T: Integrable>(
    records: &[TimeRecord<T>],
    times: &[f64],
    order: InterpOrder,
) -> Result<Vec<T>, TsError> {
    ensure_non_empty(records, "integrate")?;
    ensure_ascending(times, "integrate")?;
    let mut hint = None;
    let mut out = Vec::with_capacity(times.len().saturating_sub(1));
    for w in times.windows(2) {
        let (v, next) = segment(records, w[0], w[1], order, hint);
        hint = Some(next);
        out.push(v);
    }
    Ok(out)
}

/// Mean value of the interpolant over each consecutive pair of query times.
///
/// A zero-width pair yields the interpolated value at that instant.
///
/// # Errors
/// Same conditions as [`integrate`].
pub fn average<T: Integrable>(
    records: &[TimeRecord<T>],
    times: &[f64],
    order: InterpOrder,
) -> Result<Vec<T>, TsError> {
    let integrals = integrate(records, times, order)?;
    Ok(integrals
        .into_iter()
        .zip(times.windows(2))
        .map(|(v, w)| {
            let width = w[1] - w[0];
            if width > 0.0 {
                v * (1.0 / width)
            } else {
                estimate_with_upper(records, first_after(records, w[0]), w[0], order)
            }
        })
        .collect())
}

/// Running integral from the first record, evaluated at every later record.
///
/// The result has one entry per record after the first, stamped with that
/// record's timestamp.
///
/// # Errors
/// Returns `Err(TsError::EmptySeries)` if `records` is empty.
pub fn accumulate<T: Integrable>(
    records: &[TimeRecord<T>],
    order: InterpOrder,
) -> Result<TimeSeries<T>, TsError> {
    ensure_non_empty(records, "accumulate")?;
    let mut acc = T::zero();
    let mut out = Vec::with_capacity(records.len() - 1);
    for w in records.windows(2) {
        let dt = w[1].ts - w[0].ts;
        let piece = match order {
            InterpOrder::Hold => w[0].value.clone() * dt,
            InterpOrder::Linear => (w[0].value.clone() + w[1].value.clone()) * (0.5 * dt),
        };
        acc = acc + piece;
        out.push(TimeRecord::new(w[1].ts, acc.clone()));
    }
    Ok(TimeSeries::from_sorted_unchecked(out))
}
