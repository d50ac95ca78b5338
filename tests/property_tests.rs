//! Property-based tests for rolling statistics, windowing and ranking

use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use return_predictor::pipeline::{
    log_return_to_return, ResultFormatter, RollingMean, RollingStd, StockEncoding,
    TargetMetadata, WindowBuilder,
};
use return_predictor::types::{Feature, FeatureVector, ProcessedRecord};

fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(i as i64)
}

fn records(stock: u32, n: usize) -> Vec<ProcessedRecord> {
    (0..n)
        .map(|i| {
            let mut features = FeatureVector::default();
            features.set(Feature::LogReturn, i as f64);
            ProcessedRecord {
                date: day(i),
                stock,
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0 + i as f64,
                volume: 0.0,
                features,
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn rolling_mean_only_sees_trailing_window(
        values in prop::collection::vec(-1.0f64..1.0, 1..120),
        window in 1usize..30,
    ) {
        let full = RollingMean::compute(window, &values);
        for r in 0..values.len() {
            if r + 1 < window {
                prop_assert!(full[r].is_none());
            } else {
                let local = RollingMean::compute(window, &values[r + 1 - window..=r]);
                prop_assert_eq!(full[r], local[window - 1]);
            }
        }
    }

    #[test]
    fn rolling_std_only_sees_trailing_window(
        values in prop::collection::vec(-1.0f64..1.0, 2..120),
        window in 2usize..30,
    ) {
        let full = RollingStd::compute(window, &values);
        for r in 0..values.len() {
            if r + 1 < window {
                prop_assert!(full[r].is_none());
            } else {
                let local = RollingStd::compute(window, &values[r + 1 - window..=r]);
                prop_assert_eq!(full[r], local[window - 1]);
            }
        }
    }

    #[test]
    fn simple_return_inverts_log_return(r in -0.9f64..5.0) {
        assert_relative_eq!(log_return_to_return(r.ln_1p()), r, epsilon = 1e-12, max_relative = 1e-12);
    }

    #[test]
    fn window_counts_and_targets(
        lengths in prop::collection::vec(0usize..90, 1..5),
        window in 1usize..40,
    ) {
        let all: Vec<ProcessedRecord> = lengths
            .iter()
            .enumerate()
            .flat_map(|(code, &n)| records(code as u32, n))
            .collect();

        let set = WindowBuilder::new(window).build(&all);
        let expected: usize = lengths.iter().map(|&n| n.saturating_sub(window)).sum();
        prop_assert_eq!(set.len(), expected);

        let (windows, targets) = set.into_parts();
        let mut i = 0;
        for (code, &n) in lengths.iter().enumerate() {
            for k in 0..n.saturating_sub(window) {
                prop_assert_eq!(windows[i].stock, code as u32);
                prop_assert_eq!(windows[i].steps.len(), window);
                prop_assert_eq!(windows[i].steps[0].get(Feature::LogReturn), k as f64);
                prop_assert_eq!(targets[i].stock, code as u32);
                prop_assert_eq!(targets[i].date, day(k + window));
                i += 1;
            }
        }
    }

    #[test]
    fn ranking_is_descending_and_stable(
        buckets in prop::collection::vec(0u8..4, 0..60),
    ) {
        let encoding = StockEncoding::from_labels(["A"]);
        let targets: Vec<TargetMetadata> = (0..buckets.len())
            .map(|i| TargetMetadata { date: day(i), stock: 0, close: 1.0 })
            .collect();
        // Few distinct values so ties are common
        let predictions: Vec<f64> = buckets.iter().map(|&b| f64::from(b) * 0.01).collect();

        let ranked = ResultFormatter::new(&encoding).format(&targets, &predictions).unwrap();
        prop_assert_eq!(ranked.len(), buckets.len());

        for pair in ranked.results().windows(2) {
            prop_assert!(pair[0].predicted_return >= pair[1].predicted_return);
            if pair[0].predicted_return == pair[1].predicted_return {
                prop_assert!(pair[0].date < pair[1].date);
            }
        }
    }
}
