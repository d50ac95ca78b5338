//! Per-entity feature engineering
//!
//! Raw bars are grouped by stock, sorted by date and turned into log returns
//! plus trailing volatility/momentum over `ROLLING_HORIZONS`. Features never
//! cross an entity boundary: every group gets fresh rolling calculators.

use crate::error::{PredictorError, Result};
use crate::pipeline::encoding::StockEncoding;
use crate::pipeline::rolling::{LogReturn, RollingMean, RollingStd};
use crate::types::{
    Feature, FeatureVector, ProcessedRecord, RawRecord, StockCode, N_FEATURES, ROLLING_HORIZONS,
};
use rayon::prelude::*;

/// Output of feature engineering: records plus the stock table that decodes them
#[derive(Debug, Clone, Default)]
pub struct ProcessedFrame {
    /// Concatenation of per-entity ascending-by-date runs, entities in code order
    pub records: Vec<ProcessedRecord>,
    /// Encode/decode table built for this invocation
    pub encoding: StockEncoding,
}

impl ProcessedFrame {
    /// Number of processed rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no row survived feature engineering
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Contiguous per-entity runs in frame order
    pub fn entity_runs(&self) -> Vec<&[ProcessedRecord]> {
        entity_runs(&self.records)
    }

    /// Decoded label of a record's stock
    pub fn label(&self, code: StockCode) -> Option<&str> {
        self.encoding.decode(code)
    }
}

/// Split records into maximal runs sharing one stock code
pub fn entity_runs(records: &[ProcessedRecord]) -> Vec<&[ProcessedRecord]> {
    let mut runs = Vec::new();
    let mut start = 0;

    for i in 1..=records.len() {
        if i == records.len() || records[i].stock != records[start].stock {
            if i > start {
                runs.push(&records[start..i]);
            }
            start = i;
        }
    }

    runs
}

/// Rolling horizon with its volatility and momentum columns
const HORIZON_COLUMNS: [(usize, Feature, Feature); 3] = [
    (ROLLING_HORIZONS[0], Feature::Vol10, Feature::Mom10),
    (ROLLING_HORIZONS[1], Feature::Vol20, Feature::Mom20),
    (ROLLING_HORIZONS[2], Feature::Vol60, Feature::Mom60),
];

/// Derives log return, volatility and momentum features from raw bars
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Create engineer with the standard horizons (10, 20, 60)
    pub fn new() -> Self {
        Self
    }

    /// Longest trailing horizon; rows before it is full are dropped
    pub fn max_horizon(&self) -> usize {
        HORIZON_COLUMNS.iter().map(|(w, _, _)| *w).max().unwrap_or(1)
    }

    /// Minimum raw rows an entity needs to produce one processed row
    pub fn min_raw_rows(&self) -> usize {
        self.max_horizon() + 1
    }

    /// Turn raw bars into processed records
    pub fn process(&self, rows: &[RawRecord]) -> Result<ProcessedFrame> {
        let encoding = StockEncoding::from_labels(rows.iter().map(|r| r.stock.as_str()));

        let mut groups: Vec<Vec<&RawRecord>> = vec![Vec::new(); encoding.len()];
        for row in rows {
            validate_record(row)?;
            // Every label was registered above
            if let Some(code) = encoding.encode(&row.stock) {
                groups[code as usize].push(row);
            }
        }

        let per_entity: Vec<Vec<ProcessedRecord>> = groups
            .into_par_iter()
            .enumerate()
            .map(|(code, mut group)| {
                group.sort_by_key(|r| r.date);
                check_duplicate_dates(&group)?;
                Ok(self.process_entity(code as StockCode, &group))
            })
            .collect::<Result<Vec<_>>>()?;

        let records: Vec<ProcessedRecord> = per_entity.into_iter().flatten().collect();

        log::info!(
            "Engineered {} feature rows from {} raw rows across {} stocks",
            records.len(),
            rows.len(),
            encoding.len()
        );

        Ok(ProcessedFrame { records, encoding })
    }

    /// Compute features for one date-sorted entity group
    fn process_entity(&self, code: StockCode, group: &[&RawRecord]) -> Vec<ProcessedRecord> {
        let mut log_return = LogReturn::new();
        let mut rolling: Vec<(Feature, Feature, RollingStd, RollingMean)> = HORIZON_COLUMNS
            .iter()
            .map(|&(w, vol, mom)| (vol, mom, RollingStd::new(w), RollingMean::new(w)))
            .collect();

        let mut out = Vec::with_capacity(group.len().saturating_sub(self.max_horizon()));

        for row in group {
            let Some(ret) = log_return.update(row.close) else {
                continue;
            };

            let mut features = FeatureVector([f64::NAN; N_FEATURES]);
            features.set(Feature::LogReturn, ret);

            let mut complete = true;
            for (vol_feature, mom_feature, vol, mom) in rolling.iter_mut() {
                match (vol.update(ret), mom.update(ret)) {
                    (Some(v), Some(m)) => {
                        features.set(*vol_feature, v);
                        features.set(*mom_feature, m);
                    }
                    _ => complete = false,
                }
            }

            if complete {
                out.push(ProcessedRecord {
                    date: row.date,
                    stock: code,
                    open: row.open,
                    high: row.high,
                    low: row.low,
                    close: row.close,
                    volume: row.volume,
                    features,
                });
            }
        }

        log::debug!(
            "Stock code {}: {} raw rows -> {} feature rows",
            code,
            group.len(),
            out.len()
        );

        out
    }
}

fn validate_record(row: &RawRecord) -> Result<()> {
    let invalid = |reason: String| PredictorError::InvalidRecord {
        stock: row.stock.clone(),
        date: row.date,
        reason,
    };

    if row.stock.is_empty() {
        return Err(invalid("empty stock identifier".to_string()));
    }
    for (name, price) in [
        ("Open", row.open),
        ("High", row.high),
        ("Low", row.low),
        ("Close", row.close),
    ] {
        if !price.is_finite() || price <= 0.0 {
            return Err(invalid(format!("{} must be positive, got {}", name, price)));
        }
    }
    if !row.volume.is_finite() || row.volume < 0.0 {
        return Err(invalid(format!(
            "Volume must be non-negative, got {}",
            row.volume
        )));
    }

    Ok(())
}

fn check_duplicate_dates(group: &[&RawRecord]) -> Result<()> {
    match group.windows(2).find(|pair| pair[0].date == pair[1].date) {
        Some(pair) => Err(PredictorError::DuplicateObservation {
            stock: pair[1].stock.clone(),
            date: pair[1].date,
        }),
        None => Ok(()),
    }
}
