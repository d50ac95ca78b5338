//! # return_predictor
//!
//! Turns daily OHLCV bars for many stocks into fixed-length feature windows,
//! runs a pre-trained sequence regression model over them and ranks the
//! forecast returns across stocks and dates.
//!
//! The pipeline runs one way, once per batch of input rows:
//!
//! 1. [`pipeline::FeatureEngineer`] derives log returns plus rolling
//!    volatility and momentum per stock.
//! 2. A fitted [`pipeline::FeatureScaler`] normalizes feature columns.
//! 3. [`pipeline::WindowBuilder`] slices each stock's series into windows and
//!    pairs each with the row it targets.
//! 4. A [`pipeline::SequenceModel`] predicts one log return per window.
//! 5. [`pipeline::ResultFormatter`] converts to simple returns and ranks.
//!
//! ## Example
//!
//! ```rust,no_run
//! use return_predictor::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let rows = CsvBarReader::new().read_path(Path::new("prices.csv"))?;
//!     let scaler = StandardScaler::load(Path::new("scaler.json"))?;
//!     let model = LinearSequenceModel::load(Path::new("model.json"))?;
//!     let context = InferenceContext::new(&scaler, &model);
//!
//!     let frame = engineer_features(&rows)?;
//!     let forecast = predict_windows(&frame, &context)?;
//!     let ranked = format_results(
//!         &frame.encoding,
//!         &forecast.targets,
//!         &forecast.predicted_log_returns,
//!     )?;
//!
//!     for r in ranked.top(5) {
//!         println!("{} {} {:.3}%", r.date, r.stock, r.predicted_return_percent);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod types;

pub mod prelude {
    //! Commonly used types and functions
    pub use crate::config::{CsvFormat, PipelineConfig};
    pub use crate::data::{write_results, write_results_path, CsvBarReader};
    pub use crate::error::{ErrorKind, PredictorError, Result};
    pub use crate::pipeline::{
        engineer_features, format_results, predict_windows, FeatureScaler, InferenceContext,
        LinearSequenceModel, PredictionResult, ProcessedFrame, RawForecast, ResultSet,
        SequenceModel, StandardScaler,
    };
    pub use crate::types::*;
}
