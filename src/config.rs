//! Pipeline configuration

use crate::error::{PredictorError, Result};
use crate::types::WINDOW_SIZE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CSV input format configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvFormat {
    /// Date column name
    pub date_column: String,
    /// Stock identifier column name
    pub stock_column: String,
    /// Open price column name
    pub open_column: String,
    /// High price column name
    pub high_column: String,
    /// Low price column name
    pub low_column: String,
    /// Close price column name
    pub close_column: String,
    /// Volume column name
    pub volume_column: String,
    /// Preferred date format string (e.g., "%Y-%m-%d")
    pub date_format: String,
    /// Field delimiter
    pub delimiter: char,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            stock_column: "Stock".to_string(),
            open_column: "Open".to_string(),
            high_column: "High".to_string(),
            low_column: "Low".to_string(),
            close_column: "Close".to_string(),
            volume_column: "Volume".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            delimiter: ',',
        }
    }
}

impl CsvFormat {
    /// Column names in required-column order
    pub fn columns(&self) -> [&str; 7] {
        [
            self.date_column.as_str(),
            self.stock_column.as_str(),
            self.open_column.as_str(),
            self.high_column.as_str(),
            self.low_column.as_str(),
            self.close_column.as_str(),
            self.volume_column.as_str(),
        ]
    }
}

/// Settings for one prediction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Time steps per model input window
    pub window_size: usize,
    /// Fitted scaler artifact (JSON)
    pub scaler_path: Option<PathBuf>,
    /// Model artifact (JSON)
    pub model_path: Option<PathBuf>,
    /// Number of ranked rows shown in summaries
    pub top_n: usize,
    /// Input CSV layout
    pub csv: CsvFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_size: WINDOW_SIZE,
            scaler_path: None,
            model_path: None,
            top_n: 5,
            csv: CsvFormat::default(),
        }
    }
}

impl PipelineConfig {
    /// Check settings that would make the pipeline meaningless
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(PredictorError::ConfigError(
                "window_size must be greater than 0".to_string(),
            ));
        }
        if self.csv.date_format.is_empty() {
            return Err(PredictorError::ConfigError(
                "csv.date_format must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.window_size, 60);
        assert_eq!(config.top_n, 5);
        assert_eq!(
            config.csv.columns(),
            ["Date", "Stock", "Open", "High", "Low", "Close", "Volume"]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = PipelineConfig {
            window_size: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PredictorError::ConfigError(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"window_size": 30, "csv": {"stock_column": "Ticker"}}"#)
                .unwrap();
        assert_eq!(config.window_size, 30);
        assert_eq!(config.csv.stock_column, "Ticker");
        assert_eq!(config.csv.date_column, "Date");
        assert_eq!(config.top_n, 5);
    }
}
