//! Error types for the return predictor pipeline

use crate::types::StockCode;
use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for the prediction pipeline
#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Malformed value in column '{column}' at row {row}: {value:?}")]
    MalformedField {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Duplicate observation for {stock} on {date}")]
    DuplicateObservation { stock: String, date: NaiveDate },

    #[error("Invalid record for {stock} on {date}: {reason}")]
    InvalidRecord {
        stock: String,
        date: NaiveDate,
        reason: String,
    },

    #[error("Scaling error: {0}")]
    ScalingError(String),

    #[error(
        "Not enough data for prediction windows: {entities} entities, none with more than {window_size} processed rows"
    )]
    InsufficientData { entities: usize, window_size: usize },

    #[error("Prediction error: {0}")]
    PredictionError(String),

    #[error("Alignment error: {targets} targets but {predictions} predictions")]
    AlignmentError { targets: usize, predictions: usize },

    #[error("Alignment error: target stock code {0} has no label")]
    UnknownStockCode(StockCode),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Coarse classification of pipeline failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed input column
    Schema,
    /// Input rows violate the data model (duplicates, non-positive prices)
    Input,
    Scaling,
    InsufficientData,
    Prediction,
    Alignment,
    Config,
    Io,
}

impl PredictorError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictorError::MissingColumn(_) | PredictorError::MalformedField { .. } => {
                ErrorKind::Schema
            }
            PredictorError::DuplicateObservation { .. } | PredictorError::InvalidRecord { .. } => {
                ErrorKind::Input
            }
            PredictorError::ScalingError(_) => ErrorKind::Scaling,
            PredictorError::InsufficientData { .. } => ErrorKind::InsufficientData,
            PredictorError::PredictionError(_) => ErrorKind::Prediction,
            PredictorError::AlignmentError { .. } | PredictorError::UnknownStockCode(_) => {
                ErrorKind::Alignment
            }
            PredictorError::ConfigError(_) | PredictorError::SerdeError(_) => ErrorKind::Config,
            PredictorError::IoError(_) | PredictorError::CsvError(_) => ErrorKind::Io,
        }
    }

    /// Warning-level outcomes are expected for small uploads and should not be
    /// reported as crashes
    pub fn is_warning(&self) -> bool {
        self.kind() == ErrorKind::InsufficientData
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PredictorError>;
