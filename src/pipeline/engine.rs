//! Pipeline entry points
//!
//! Data flows one way: features → scaling → windowing → model → ranking.

use crate::error::{PredictorError, Result};
use crate::pipeline::encoding::StockEncoding;
use crate::pipeline::features::{FeatureEngineer, ProcessedFrame};
use crate::pipeline::model::{InferenceContext, Predictor, WindowBatch};
use crate::pipeline::results::{ResultFormatter, ResultSet};
use crate::pipeline::scaler::scale_records;
use crate::pipeline::windows::{TargetMetadata, WindowBuilder};
use crate::types::RawRecord;

/// Unranked model output paired with its targets
#[derive(Debug, Clone)]
pub struct RawForecast {
    pub targets: Vec<TargetMetadata>,
    pub predicted_log_returns: Vec<f64>,
}

impl RawForecast {
    /// Number of predictions
    pub fn len(&self) -> usize {
        self.predicted_log_returns.len()
    }

    /// True when nothing was predicted
    pub fn is_empty(&self) -> bool {
        self.predicted_log_returns.is_empty()
    }
}

/// Engineer features from raw bars
pub fn engineer_features(raw_rows: &[RawRecord]) -> Result<ProcessedFrame> {
    FeatureEngineer::new().process(raw_rows)
}

/// Scale, window and predict every entity of a processed frame
///
/// Returns `InsufficientData` when no entity has more processed rows than the
/// model's window size, and `PredictionError` for a model with no window.
pub fn predict_windows(frame: &ProcessedFrame, context: &InferenceContext<'_>) -> Result<RawForecast> {
    let window_size = context.window_size();
    if window_size == 0 {
        return Err(PredictorError::PredictionError(format!(
            "Model '{}' declares a zero-length input window",
            context.model.name()
        )));
    }
    let scaled = scale_records(&frame.records, context.scaler)?;

    let set = WindowBuilder::new(window_size).build(&scaled);
    if set.is_empty() {
        log::warn!(
            "No stock has more than {} processed rows; nothing to predict",
            window_size
        );
        return Err(PredictorError::InsufficientData {
            entities: frame.encoding.len(),
            window_size,
        });
    }

    let (windows, targets) = set.into_parts();
    let batch = WindowBatch::new(&windows, window_size)?;
    let predicted_log_returns = Predictor::new(context.model).predict(&batch)?;

    Ok(RawForecast {
        targets,
        predicted_log_returns,
    })
}

/// Convert predicted log returns to ranked simple returns
pub fn format_results(
    encoding: &StockEncoding,
    targets: &[TargetMetadata],
    raw_predictions: &[f64],
) -> Result<ResultSet> {
    ResultFormatter::new(encoding).format(targets, raw_predictions)
}

/// Run all three stages on one batch of raw bars
pub fn run(raw_rows: &[RawRecord], context: &InferenceContext<'_>) -> Result<ResultSet> {
    let frame = engineer_features(raw_rows)?;
    let forecast = predict_windows(&frame, context)?;
    format_results(
        &frame.encoding,
        &forecast.targets,
        &forecast.predicted_log_returns,
    )
}
