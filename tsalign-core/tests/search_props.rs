use proptest::prelude::*;
use tsalign_core::{
    InterpOrder, TimeInterval, TimeRecord, TimeSeries, find_inner, find_outer, get_inner,
    interpolate, view_outer,
};

fn arb_series() -> impl Strategy<Value = TimeSeries<f64>> {
    proptest::collection::vec((-1_000i32..1_000i32, -50.0f64..50.0), 0..64).prop_map(|pairs| {
        let records = pairs
            .into_iter()
            .map(|(t, v)| TimeRecord::new(f64::from(t) * 0.5, v))
            .collect();
        TimeSeries::from_records(records).unwrap()
    })
}

fn arb_interval() -> impl Strategy<Value = TimeInterval> {
    (-1_200i32..1_200i32, -1_200i32..1_200i32)
        .prop_map(|(a, b)| TimeInterval::new(f64::from(a) * 0.5, f64::from(b) * 0.5).unwrap())
}

proptest! {
    #[test]
    fn inner_is_within_outer(ts in arb_series(), iv in arb_interval()) {
        let inner = find_inner(&ts, &iv);
        let outer = find_outer(&ts, &iv);
        prop_assert!(inner.start <= inner.end);
        if !ts.is_empty() {
            prop_assert!(!outer.is_empty());
            prop_assert!(outer.end <= ts.len());
        }
        if !inner.is_empty() {
            prop_assert!(outer.start <= inner.start && inner.end <= outer.end);
        }
    }

    #[test]
    fn inner_records_lie_in_interval(ts in arb_series(), iv in arb_interval()) {
        for r in get_inner(&ts, &iv).iter() {
            prop_assert!(iv.contains(r.ts));
        }
        let inner = find_inner(&ts, &iv);
        // records just outside the inner range are outside the interval
        if inner.start > 0 {
            prop_assert!(ts[inner.start - 1].ts < iv.lo());
        }
        if inner.end < ts.len() {
            prop_assert!(ts[inner.end].ts > iv.hi());
        }
    }

    #[test]
    fn outer_brackets_when_possible(ts in arb_series(), iv in arb_interval()) {
        let w = view_outer(&ts, &iv);
        if let (Some(first), Some(last)) = (ts.first(), ts.last()) {
            let (wf, wl) = (&w[0], &w[w.len() - 1]);
            if first.ts <= iv.lo() {
                prop_assert!(wf.ts <= iv.lo());
            }
            if last.ts >= iv.hi() {
                prop_assert!(wl.ts >= iv.hi());
            }
        }
    }

    #[test]
    fn keep_latest_at_is_idempotent(ts in arb_series(), t in -600.0f64..600.0) {
        let mut once = ts.clone();
        once.keep_latest_at(t);
        let mut twice = once.clone();
        twice.keep_latest_at(t);
        prop_assert_eq!(&once, &twice);
        // the retained tail is a suffix of the original
        prop_assert_eq!(&ts[ts.len() - once.len()..], once.as_slice());
    }

    #[test]
    fn hold_returns_record_value_at_its_own_timestamp(ts in arb_series()) {
        for (i, r) in ts.iter().enumerate() {
            // with ties the latest record at that instant wins
            let is_last_tie = ts.get(i + 1).is_none_or(|n| n.ts > r.ts);
            if is_last_tie {
                prop_assert_eq!(interpolate(&ts, r.ts, InterpOrder::Hold).unwrap(), r.value);
            }
        }
    }

    #[test]
    fn push_preserves_order(ts in arb_series(), extra in proptest::collection::vec(-600.0f64..600.0, 0..20)) {
        let mut ts = ts;
        for (k, t) in extra.into_iter().enumerate() {
            let at = ts.push(TimeRecord::new(t, k as f64)).unwrap();
            prop_assert_eq!(ts[at].ts, t);
        }
        prop_assert!(ts.windows(2).all(|w| w[0].ts <= w[1].ts));
    }
}
