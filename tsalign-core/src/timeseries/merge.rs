use super::interpolate::estimate_with_upper;
use super::search::first_after;
use super::util::{ensure_ascending, ensure_non_empty};
use crate::{InterpOrder, Linear, TimeRecord, TimeSeries, TsError};

fn sorted_union<I: IntoIterator<Item = f64>>(times: I) -> Vec<f64> {
    let mut out: Vec<f64> = times.into_iter().collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

/// Sorted union of every timestamp present across the input series.
#[must_use]
pub fn union_timestamps<T, S: AsRef<[TimeRecord<T>]>>(series: &[S]) -> Vec<f64> {
    sorted_union(series.iter().flat_map(|s| s.as_ref().iter().map(|r| r.ts)))
}

/// Resolve the timeline: the caller's query times (validated) or the union.
fn timeline(query: Option<&[f64]>, union: impl FnOnce() -> Vec<f64>) -> Result<Vec<f64>, TsError> {
    match query {
        Some(q) => {
            ensure_ascending(q, "merge")?;
            Ok(q.to_vec())
        }
        None => Ok(union()),
    }
}

/// Evaluate every series at each timeline point and fold the values with `combine`.
///
/// `series` accepts owned series, borrowed views, or references to either.
/// `combine` receives one value per input series, in input order. Each series
/// is interpolated with flat saturation, so points outside a series' own range
/// take its nearest endpoint value. Without `query`, the timeline is the
/// sorted union of all input timestamps.
///
/// # Errors
/// - `Err(TsError::InvalidArg)` if `series` is empty or `query` is not ascending.
/// - `Err(TsError::EmptySeries)` if any input series is empty.
/// - `Err(TsError::InvalidTimestamp)` if `query` contains NaN.
pub fn merge_with<T, S, U, F>(
    mut combine: F,
    query: Option<&[f64]>,
    series: &[S],
    order: InterpOrder,
) -> Result<TimeSeries<U>, TsError>
where
    T: Linear,
    S: AsRef<[TimeRecord<T>]>,
    F: FnMut(&[T]) -> U,
{
    if series.is_empty() {
        return Err(TsError::invalid_arg("merge needs at least one series"));
    }
    for s in series {
        ensure_non_empty(s.as_ref(), "merge")?;
    }
    let times = timeline(query, || union_timestamps(series))?;

    let mut row: Vec<T> = Vec::with_capacity(series.len());
    let mut out = Vec::with_capacity(times.len());
    for t in times {
        row.clear();
        row.extend(series.iter().map(|s| {
            let s = s.as_ref();
            estimate_with_upper(s, first_after(s, t), t, order)
        }));
        out.push(TimeRecord::new(t, combine(&row)));
    }
    Ok(TimeSeries::from_sorted_unchecked(out))
}

/// [`merge_with`] using the default combiner, which collects one value per series.
///
/// ```
/// use tsalign_core::{InterpOrder, TimeSeries, merge};
///
/// let a = TimeSeries::from_sorted_parts(vec![1.0, 3.0], vec![1.0, 3.0]).unwrap();
/// let b = TimeSeries::from_sorted_parts(vec![2.0], vec![20.0]).unwrap();
/// let m = merge(None, &[&a, &b], InterpOrder::Linear).unwrap();
/// assert_eq!(m.timestamps().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
/// assert_eq!(m[1].value, vec![2.0, 20.0]);
/// ```
///
/// # Errors
/// Same conditions as [`merge_with`].
pub fn merge<T, S>(
    query: Option<&[f64]>,
    series: &[S],
    order: InterpOrder,
) -> Result<TimeSeries<Vec<T>>, TsError>
where
    T: Linear,
    S: AsRef<[TimeRecord<T>]>,
{
    merge_with(<[T]>::to_vec, query, series, order)
}

/// Merge two series with possibly different value types through `combine`.
///
/// # Errors
/// - `Err(TsError::EmptySeries)` if either series is empty.
/// - `Err(TsError::InvalidArg)` / `Err(TsError::InvalidTimestamp)` if `query`
///   is not ascending or contains NaN.
pub fn merge_pair_with<A, B, U, F>(
    mut combine: F,
    query: Option<&[f64]>,
    a: &[TimeRecord<A>],
    b: &[TimeRecord<B>],
    order: InterpOrder,
) -> Result<TimeSeries<U>, TsError>
where
    A: Linear,
    B: Linear,
    F: FnMut(A, B) -> U,
{
    ensure_non_empty(a, "merge")?;
    ensure_non_empty(b, "merge")?;
    let times = timeline(query, || {
        sorted_union(a.iter().map(|r| r.ts).chain(b.iter().map(|r| r.ts)))
    })?;
    Ok(TimeSeries::from_sorted_unchecked(
        times
            .into_iter()
            .map(|t| {
                let va = estimate_with_upper(a, first_after(a, t), t, order);
                let vb = estimate_with_upper(b, first_after(b, t), t, order);
                TimeRecord::new(t, combine(va, vb))
            })
            .collect(),
    ))
}

/// Merge two series into a series of value pairs.
///
/// Tuples carry no arithmetic, so integrating the result needs an explicit
/// elementwise mapping first (e.g. `map_values` into a vector type).
///
/// # Errors
/// Same conditions as [`merge_pair_with`].
pub fn merge_pair<A: Linear, B: Linear>(
    query: Option<&[f64]>,
    a: &[TimeRecord<A>],
    b: &[TimeRecord<B>],
    order: InterpOrder,
) -> Result<TimeSeries<(A, B)>, TsError> {
    merge_pair_with(|x, y| (x, y), query, a, b, order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five() -> TimeSeries<f64> {
        TimeSeries::from_sorted_parts(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
    }

    fn two() -> TimeSeries<f64> {
        TimeSeries::from_sorted_parts(vec![1.5, 2.6], vec![1.5, 2.6]).unwrap()
    }

    #[test]
    fn pair_merge_over_union() {
        let m = merge_pair(None, &five(), &two(), InterpOrder::Linear).unwrap();
        assert_eq!(
            m.timestamps().collect::<Vec<_>>(),
            vec![1.0, 1.5, 2.0, 2.6, 3.0, 4.0, 5.0]
        );
        let got: Vec<(f64, f64)> = m.values().copied().collect();
        let want = [
            (1.0, 1.5),
            (1.5, 1.5),
            (2.0, 2.0),
            (2.6, 2.6),
            (3.0, 2.6),
            (4.0, 2.6),
            (5.0, 2.6),
        ];
        for (g, w) in got.iter().zip(want) {
            assert!((g.0 - w.0).abs() < 1e-12 && (g.1 - w.1).abs() < 1e-12, "{g:?} != {w:?}");
        }
    }

    #[test]
    fn slice_merge_matches_pair_merge() {
        let (a, b) = (five(), two());
        let m = merge(None, &[&a, &b], InterpOrder::Hold).unwrap();
        let p = merge_pair(None, &a, &b, InterpOrder::Hold).unwrap();
        for (x, y) in m.iter().zip(p.iter()) {
            assert_eq!(x.ts, y.ts);
            assert_eq!(x.value, vec![y.value.0, y.value.1]);
        }
    }

    #[test]
    fn custom_combiner_and_query_times() {
        let (a, b) = (five(), two());
        let sum = merge_with(
            |v: &[f64]| v.iter().sum::<f64>(),
            Some(&[1.0, 3.0][..]),
            &[&a, &b],
            InterpOrder::Hold,
        )
        .unwrap();
        assert_eq!(sum.timestamps().collect::<Vec<_>>(), vec![1.0, 3.0]);
        assert_eq!(sum[0].value, 2.5);
        assert!((sum[1].value - 5.6).abs() < 1e-12);
    }

    #[test]
    fn merge_errors() {
        let a = five();
        let empty: TimeSeries<f64> = TimeSeries::new();
        assert!(matches!(
            merge::<f64, &[TimeRecord<f64>]>(None, &[], InterpOrder::Hold),
            Err(TsError::InvalidArg(_))
        ));
        assert!(matches!(
            merge(None, &[&a, &empty], InterpOrder::Hold),
            Err(TsError::EmptySeries { .. })
        ));
        assert!(merge(Some(&[2.0, 1.0][..]), &[&a], InterpOrder::Hold).is_err());
    }

    #[test]
    fn union_deduplicates_shared_timestamps() {
        let (a, b) = (five(), five());
        assert_eq!(union_timestamps(&[&a, &b]), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }
}
