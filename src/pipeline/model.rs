//! Sequence model boundary
//!
//! The model is an opaque, pre-trained regression function from a batch of
//! windows `[n_windows, window_size, n_features]` to one predicted log return
//! per window. Loading and caching artifacts is the caller's business: they
//! build an `InferenceContext` once and lend it to every invocation.

use crate::error::{PredictorError, Result};
use crate::pipeline::scaler::FeatureScaler;
use crate::pipeline::windows::Window;
use crate::types::N_FEATURES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Batch of equally shaped windows
#[derive(Debug, Clone, Copy)]
pub struct WindowBatch<'a> {
    windows: &'a [Window],
    window_size: usize,
}

impl<'a> WindowBatch<'a> {
    /// Wrap windows, checking they all have `window_size` steps
    pub fn new(windows: &'a [Window], window_size: usize) -> Result<Self> {
        if let Some((i, w)) = windows.iter().enumerate().find(|(_, w)| w.len() != window_size) {
            return Err(PredictorError::PredictionError(format!(
                "Window {} has {} steps, expected {}",
                i,
                w.len(),
                window_size
            )));
        }
        Ok(Self {
            windows,
            window_size,
        })
    }

    /// `(n_windows, window_size, n_features)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.windows.len(), self.window_size, N_FEATURES)
    }

    /// Windows in batch order
    pub fn windows(&self) -> &'a [Window] {
        self.windows
    }

    /// Number of windows
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// True when the batch holds no windows
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Pre-trained sequence regression model
///
/// Implementations must be deterministic and must not retain state between
/// calls.
pub trait SequenceModel: Send + Sync {
    /// Predict one log return per window
    fn predict(&self, batch: &WindowBatch<'_>) -> Result<Vec<f64>>;

    /// Expected `(window_size, n_features)` of each input window
    fn input_shape(&self) -> (usize, usize);

    /// Model name for logging
    fn name(&self) -> &str;
}

/// Caller-owned, read-only handles to the loaded scaler and model
#[derive(Clone, Copy)]
pub struct InferenceContext<'a> {
    pub scaler: &'a dyn FeatureScaler,
    pub model: &'a dyn SequenceModel,
}

impl<'a> InferenceContext<'a> {
    /// Pair a scaler with a model
    pub fn new(scaler: &'a dyn FeatureScaler, model: &'a dyn SequenceModel) -> Self {
        Self { scaler, model }
    }

    /// Window length the model consumes
    pub fn window_size(&self) -> usize {
        self.model.input_shape().0
    }
}

/// Runs a model on a batch and checks its output contract
pub struct Predictor<'a> {
    model: &'a dyn SequenceModel,
}

impl<'a> Predictor<'a> {
    /// Wrap a model
    pub fn new(model: &'a dyn SequenceModel) -> Self {
        Self { model }
    }

    /// Predict log returns; any model fault is fatal and not retried
    pub fn predict(&self, batch: &WindowBatch<'_>) -> Result<Vec<f64>> {
        let (n, steps, features) = batch.shape();
        let (expected_steps, expected_features) = self.model.input_shape();

        if (steps, features) != (expected_steps, expected_features) {
            return Err(PredictorError::PredictionError(format!(
                "Model '{}' expects windows of shape ({}, {}), got ({}, {})",
                self.model.name(),
                expected_steps,
                expected_features,
                steps,
                features
            )));
        }

        let output = self.model.predict(batch)?;

        if output.len() != n {
            return Err(PredictorError::PredictionError(format!(
                "Model '{}' returned {} predictions for {} windows",
                self.model.name(),
                output.len(),
                n
            )));
        }
        if let Some(i) = output.iter().position(|v| !v.is_finite()) {
            return Err(PredictorError::PredictionError(format!(
                "Model '{}' returned non-finite prediction at index {}",
                self.model.name(),
                i
            )));
        }

        log::info!("Model '{}' predicted {} windows", self.model.name(), n);

        Ok(output)
    }
}

/// Linear model over the flattened window: `bias + sum(weights * x)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSequenceModel {
    #[serde(default = "default_model_name")]
    pub name: String,
    /// `[window_size][n_features]` weights
    pub weights: Vec<Vec<f64>>,
    #[serde(default)]
    pub bias: f64,
}

fn default_model_name() -> String {
    "linear".to_string()
}

impl LinearSequenceModel {
    /// Create a model, checking every weight row covers all features
    pub fn new(name: impl Into<String>, weights: Vec<Vec<f64>>, bias: f64) -> Result<Self> {
        let model = Self {
            name: name.into(),
            weights,
            bias,
        };
        model.validate()?;
        Ok(model)
    }

    /// Load a JSON model artifact
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&contents)?;
        model.validate()?;
        log::info!(
            "Loaded model '{}' with window size {} from {}",
            model.name,
            model.weights.len(),
            path.display()
        );
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.weights.is_empty() {
            return Err(PredictorError::ConfigError(format!(
                "Model '{}' has no weight rows",
                self.name
            )));
        }
        if let Some(i) = self.weights.iter().position(|row| row.len() != N_FEATURES) {
            return Err(PredictorError::ConfigError(format!(
                "Model '{}' weight row {} has {} values, expected {}",
                self.name,
                i,
                self.weights[i].len(),
                N_FEATURES
            )));
        }
        Ok(())
    }
}

impl SequenceModel for LinearSequenceModel {
    fn predict(&self, batch: &WindowBatch<'_>) -> Result<Vec<f64>> {
        Ok(batch
            .windows()
            .iter()
            .map(|window| {
                window
                    .steps
                    .iter()
                    .zip(&self.weights)
                    .map(|(step, row)| {
                        step.as_slice()
                            .iter()
                            .zip(row)
                            .map(|(x, w)| x * w)
                            .sum::<f64>()
                    })
                    .sum::<f64>()
                    + self.bias
            })
            .collect())
    }

    fn input_shape(&self) -> (usize, usize) {
        (self.weights.len(), N_FEATURES)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
