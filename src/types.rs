//! Core types and constants

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar date of a daily bar
pub type Date = NaiveDate;

/// Price type
pub type Price = f64;

/// Volume type
pub type Volume = f64;

/// Per-invocation integer code of a stock identifier
pub type StockCode = u32;

/// Number of consecutive processed rows fed to the model per prediction
pub const WINDOW_SIZE: usize = 60;

/// Trailing horizons for rolling volatility and momentum
pub const ROLLING_HORIZONS: [usize; 3] = [10, 20, 60];

/// Raw input columns, in the order they are checked
pub const REQUIRED_COLUMNS: [&str; 7] = ["Date", "Stock", "Open", "High", "Low", "Close", "Volume"];

/// Number of model input features per time step
pub const N_FEATURES: usize = 7;

/// Model input features, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    LogReturn,
    Vol10,
    Mom10,
    Vol20,
    Mom20,
    Vol60,
    Mom60,
}

impl Feature {
    /// All features in model column order
    pub const ALL: [Feature; N_FEATURES] = [
        Feature::LogReturn,
        Feature::Vol10,
        Feature::Mom10,
        Feature::Vol20,
        Feature::Mom20,
        Feature::Vol60,
        Feature::Mom60,
    ];

    /// Column name used in tabular input/output and scaler artifacts
    pub fn name(&self) -> &'static str {
        match self {
            Feature::LogReturn => "LogReturn",
            Feature::Vol10 => "Vol_10",
            Feature::Mom10 => "Mom_10",
            Feature::Vol20 => "Vol_20",
            Feature::Mom20 => "Mom_20",
            Feature::Vol60 => "Vol_60",
            Feature::Mom60 => "Mom_60",
        }
    }

    /// Look up a feature by column name
    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Column index within a `FeatureVector`
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One time step of model input
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; N_FEATURES]);

impl FeatureVector {
    /// Get a feature value
    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    /// Set a feature value
    pub fn set(&mut self, feature: Feature, value: f64) {
        self.0[feature.index()] = value;
    }

    /// View as a slice in column order
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// True when every value is finite
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

/// Daily OHLCV bar for one stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub date: Date,
    pub stock: String,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Volume,
}

impl RawRecord {
    /// Create a new raw record
    pub fn new(
        date: Date,
        stock: impl Into<String>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Volume,
    ) -> Self {
        Self {
            date,
            stock: stock.into(),
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Raw bar extended with engineered features
///
/// The stock is carried as its per-invocation code; decode it through the
/// `StockEncoding` of the frame that produced the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub date: Date,
    pub stock: StockCode,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Volume,
    pub features: FeatureVector,
}

impl ProcessedRecord {
    /// Log return of this row
    pub fn log_return(&self) -> f64 {
        self.features.get(Feature::LogReturn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_names_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(Feature::from_name(feature.name()), Some(feature));
        }
        assert_eq!(Feature::from_name("Vol_30"), None);
    }

    #[test]
    fn test_feature_indices_follow_column_order() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
        }
    }

    #[test]
    fn test_feature_vector_access() {
        let mut v = FeatureVector([0.0; N_FEATURES]);
        v.set(Feature::Mom20, 0.25);

        assert_eq!(v.get(Feature::Mom20), 0.25);
        assert_eq!(v.as_slice()[4], 0.25);
        assert!(v.is_finite());

        v.set(Feature::Vol10, f64::NAN);
        assert!(!v.is_finite());
    }
}
