//! Inverse transform of predicted log returns and cross-stock ranking

use crate::error::{PredictorError, Result};
use crate::pipeline::encoding::StockEncoding;
use crate::pipeline::windows::TargetMetadata;
use crate::types::{Date, Price};
use serde::Serialize;
use std::cmp::Ordering;

/// Simple return from a log return: `exp(x) - 1`
pub fn log_return_to_return(log_return: f64) -> f64 {
    log_return.exp_m1()
}

/// Ranked prediction for one stock and date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub date: Date,
    pub stock: String,
    pub close: Price,
    pub predicted_log_return: f64,
    pub predicted_return: f64,
    pub predicted_return_percent: f64,
}

/// Attaches predictions to their targets and ranks them
pub struct ResultFormatter<'a> {
    encoding: &'a StockEncoding,
}

impl<'a> ResultFormatter<'a> {
    /// Create a formatter that decodes stocks through `encoding`
    pub fn new(encoding: &'a StockEncoding) -> Self {
        Self { encoding }
    }

    /// Format and rank, best predicted return first
    ///
    /// Equal predicted returns keep their input order.
    pub fn format(
        &self,
        targets: &[TargetMetadata],
        predicted_log_returns: &[f64],
    ) -> Result<ResultSet> {
        if targets.len() != predicted_log_returns.len() {
            return Err(PredictorError::AlignmentError {
                targets: targets.len(),
                predictions: predicted_log_returns.len(),
            });
        }

        if let Some(i) = predicted_log_returns.iter().position(|v| !v.is_finite()) {
            return Err(PredictorError::PredictionError(format!(
                "Non-finite predicted log return at index {}: {}",
                i, predicted_log_returns[i]
            )));
        }

        let mut results = targets
            .iter()
            .zip(predicted_log_returns)
            .map(|(target, &log_return)| {
                let stock = self
                    .encoding
                    .decode(target.stock)
                    .ok_or(PredictorError::UnknownStockCode(target.stock))?;
                let predicted_return = log_return_to_return(log_return);
                Ok(PredictionResult {
                    date: target.date,
                    stock: stock.to_string(),
                    close: target.close,
                    predicted_log_return: log_return,
                    predicted_return,
                    predicted_return_percent: predicted_return * 100.0,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Vec::sort_by is stable; inputs are finite so partial_cmp is total
        results.sort_by(|a, b| {
            b.predicted_return
                .partial_cmp(&a.predicted_return)
                .unwrap_or(Ordering::Equal)
        });

        Ok(ResultSet { results })
    }
}

/// Max/min view of a result set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub count: usize,
    pub max_return_percent: f64,
    pub min_return_percent: f64,
    pub mean_return_percent: f64,
}

/// Predictions ranked by predicted return, descending
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    results: Vec<PredictionResult>,
}

impl ResultSet {
    /// Ranked results
    pub fn results(&self) -> &[PredictionResult] {
        &self.results
    }

    /// Take ownership of the ranked results
    pub fn into_results(self) -> Vec<PredictionResult> {
        self.results
    }

    /// Number of results
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when there are no results
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Best `n` results
    pub fn top(&self, n: usize) -> &[PredictionResult] {
        &self.results[..n.min(self.results.len())]
    }

    /// Results sorted by date ascending, ranking order kept within a date
    pub fn chronological(&self) -> Vec<&PredictionResult> {
        let mut by_date: Vec<&PredictionResult> = self.results.iter().collect();
        by_date.sort_by_key(|r| r.date);
        by_date
    }

    /// Max, min and mean predicted return percent; `None` when empty
    pub fn summary(&self) -> Option<ResultSummary> {
        let first = self.results.first()?;
        let last = self.results.last()?;
        let mean = self
            .results
            .iter()
            .map(|r| r.predicted_return_percent)
            .sum::<f64>()
            / self.results.len() as f64;

        Some(ResultSummary {
            count: self.results.len(),
            max_return_percent: first.predicted_return_percent,
            min_return_percent: last.predicted_return_percent,
            mean_return_percent: mean,
        })
    }
}
