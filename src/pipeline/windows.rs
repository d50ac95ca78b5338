//! Fixed-length model input windows and the rows they target

use crate::pipeline::features::entity_runs;
use crate::types::{Date, FeatureVector, Price, ProcessedRecord, StockCode};
use rayon::prelude::*;

/// `window_size` consecutive feature rows of one stock
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub stock: StockCode,
    pub steps: Vec<FeatureVector>,
}

impl Window {
    /// Number of time steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when the window has no time steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Identity of the row a window's prediction applies to
#[derive(Debug, Clone, PartialEq)]
pub struct TargetMetadata {
    pub date: Date,
    pub stock: StockCode,
    /// Close of the target row (unscaled)
    pub close: Price,
}

impl From<&ProcessedRecord> for TargetMetadata {
    fn from(record: &ProcessedRecord) -> Self {
        Self {
            date: record.date,
            stock: record.stock,
            close: record.close,
        }
    }
}

/// Windows paired index-for-index with their targets
#[derive(Debug, Clone, Default)]
pub struct WindowSet {
    pub window_size: usize,
    pub windows: Vec<Window>,
    pub targets: Vec<TargetMetadata>,
}

impl WindowSet {
    /// Number of windows
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// True when no entity had more rows than the window size
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Split into windows and targets
    pub fn into_parts(self) -> (Vec<Window>, Vec<TargetMetadata>) {
        (self.windows, self.targets)
    }
}

/// Slices per-entity feature series into overlapping windows
#[derive(Debug, Clone)]
pub struct WindowBuilder {
    window_size: usize,
}

impl WindowBuilder {
    /// Create a builder for windows of `window_size` steps
    pub fn new(window_size: usize) -> Self {
        if window_size == 0 {
            panic!("Window size must be greater than 0");
        }
        Self { window_size }
    }

    /// Configured window length
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of windows an entity with `n` processed rows yields
    pub fn window_count(&self, n: usize) -> usize {
        n.saturating_sub(self.window_size)
    }

    /// Build windows and targets for every entity, in input entity order
    ///
    /// Records must come grouped by stock and sorted by date within each group,
    /// as `FeatureEngineer` emits them.
    pub fn build(&self, records: &[ProcessedRecord]) -> WindowSet {
        let runs = entity_runs(records);

        let per_entity: Vec<(Vec<Window>, Vec<TargetMetadata>)> = runs
            .par_iter()
            .map(|run| self.build_entity(run))
            .collect();

        let mut set = WindowSet {
            window_size: self.window_size,
            windows: Vec::new(),
            targets: Vec::new(),
        };
        for (windows, targets) in per_entity {
            set.windows.extend(windows);
            set.targets.extend(targets);
        }

        log::info!(
            "Built {} windows of {} steps from {} entities",
            set.len(),
            self.window_size,
            runs.len()
        );

        set
    }

    fn build_entity(&self, run: &[ProcessedRecord]) -> (Vec<Window>, Vec<TargetMetadata>) {
        let count = self.window_count(run.len());
        let mut windows = Vec::with_capacity(count);
        let mut targets = Vec::with_capacity(count);

        for k in 0..count {
            let slice = &run[k..k + self.window_size];
            windows.push(Window {
                stock: run[k].stock,
                steps: slice.iter().map(|r| r.features).collect(),
            });
            targets.push(TargetMetadata::from(&run[k + self.window_size]));
        }

        (windows, targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Feature, N_FEATURES};
    use chrono::{Duration, NaiveDate};

    fn records(stock: StockCode, n: usize) -> Vec<ProcessedRecord> {
        let start = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
        (0..n)
            .map(|i| {
                let mut features = FeatureVector([0.0; N_FEATURES]);
                features.set(Feature::LogReturn, i as f64);
                ProcessedRecord {
                    date: start + Duration::days(i as i64),
                    stock,
                    open: 1.0,
                    high: 1.0,
                    low: 1.0,
                    close: 100.0 + i as f64,
                    volume: 0.0,
                    features,
                }
            })
            .collect()
    }

    #[test]
    fn test_window_count_and_targets() {
        let input = records(0, 65);
        let set = WindowBuilder::new(60).build(&input);

        assert_eq!(set.len(), 5);
        assert_eq!(set.targets.len(), 5);
        for (k, (window, target)) in set.windows.iter().zip(&set.targets).enumerate() {
            assert_eq!(window.len(), 60);
            assert_eq!(window.steps[0].get(Feature::LogReturn), k as f64);
            assert_eq!(window.steps[59].get(Feature::LogReturn), (k + 59) as f64);
            assert_eq!(target.date, input[k + 60].date);
            assert_eq!(target.close, input[k + 60].close);
        }
    }

    #[test]
    fn test_window_never_contains_target() {
        let input = records(0, 61);
        let set = WindowBuilder::new(60).build(&input);

        assert_eq!(set.len(), 1);
        let target_value = input[60].features.get(Feature::LogReturn);
        assert!(set.windows[0]
            .steps
            .iter()
            .all(|s| s.get(Feature::LogReturn) != target_value));
    }

    #[test]
    fn test_short_entities_yield_nothing() {
        let builder = WindowBuilder::new(60);

        assert!(builder.build(&records(0, 60)).is_empty());
        assert!(builder.build(&records(0, 10)).is_empty());
        assert!(builder.build(&[]).is_empty());
    }

    #[test]
    fn test_mixed_entities_keep_order() {
        let mut input = records(0, 59);
        input.extend(records(1, 120));

        let set = WindowBuilder::new(60).build(&input);

        assert_eq!(set.len(), 60);
        assert!(set.windows.iter().all(|w| w.stock == 1));
        assert!(set.targets.windows(2).all(|t| t[0].date < t[1].date));
    }

    #[test]
    fn test_entity_order_preserved() {
        let mut input = records(2, 63);
        input.extend(records(0, 62));

        let set = WindowBuilder::new(60).build(&input);
        let stocks: Vec<StockCode> = set.targets.iter().map(|t| t.stock).collect();

        assert_eq!(stocks, vec![2, 2, 2, 0, 0]);
    }
}
