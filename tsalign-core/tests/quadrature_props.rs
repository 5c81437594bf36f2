use proptest::prelude::*;
use tsalign_core::{
    InterpOrder, TimeInterval, TimeRecord, TimeSeries, accumulate, average, integral, integrate,
    merge,
};

fn arb_series(min_len: usize) -> impl Strategy<Value = TimeSeries<f64>> {
    proptest::collection::vec((0i32..400i32, 0.0f64..100.0), min_len..48).prop_map(|pairs| {
        let records = pairs
            .into_iter()
            .map(|(t, v)| TimeRecord::new(f64::from(t) * 0.25, v))
            .collect();
        TimeSeries::from_records(records).unwrap()
    })
}

fn arb_order() -> impl Strategy<Value = InterpOrder> {
    prop_oneof![Just(InterpOrder::Hold), Just(InterpOrder::Linear)]
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * (1.0 + a.abs().max(b.abs()))
}

proptest! {
    #[test]
    fn accumulate_hold_is_monotone_for_non_negative_values(ts in arb_series(1)) {
        let acc = accumulate(&ts, InterpOrder::Hold).unwrap();
        prop_assert_eq!(acc.len(), ts.len() - 1);
        prop_assert!(acc.windows(2).all(|w| w[0].value <= w[1].value));
    }

    #[test]
    fn integral_is_additive(ts in arb_series(1), a in -5.0f64..105.0, b in -5.0f64..105.0, c in -5.0f64..105.0, order in arb_order()) {
        let mut q = [a, b, c];
        q.sort_by(f64::total_cmp);
        let parts = integrate(&ts, &q, order).unwrap();
        let whole = integral(&ts, &TimeInterval::new(q[0], q[2]).unwrap(), order, None).unwrap();
        prop_assert!(close(parts[0] + parts[1], whole), "{} + {} != {}", parts[0], parts[1], whole);
    }

    #[test]
    fn accumulate_matches_integrate_over_own_timestamps(ts in arb_series(2), order in arb_order()) {
        let times: Vec<f64> = ts.timestamps().collect();
        let pieces = integrate(&ts, &times, order).unwrap();
        let acc = accumulate(&ts, order).unwrap();
        let mut running = 0.0;
        for (p, r) in pieces.iter().zip(acc.iter()) {
            running += p;
            prop_assert!(close(running, r.value));
        }
    }

    #[test]
    fn average_stays_within_value_bounds(ts in arb_series(1), a in -5.0f64..105.0, w in 0.01f64..50.0, order in arb_order()) {
        let avg = average(&ts, &[a, a + w], order).unwrap();
        let lo = ts.values().copied().fold(f64::INFINITY, f64::min);
        let hi = ts.values().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(avg[0] >= lo - 1e-9 && avg[0] <= hi + 1e-9);
    }

    #[test]
    fn merge_over_union_has_one_row_per_distinct_timestamp(a in arb_series(1), b in arb_series(1), order in arb_order()) {
        let m = merge(None, &[&a, &b], order).unwrap();
        let mut all: Vec<f64> = a.timestamps().chain(b.timestamps()).collect();
        all.sort_by(f64::total_cmp);
        all.dedup();
        prop_assert_eq!(m.timestamps().collect::<Vec<_>>(), all);
        prop_assert!(m.iter().all(|r| r.value.len() == 2));
    }
}
