//! Affine feature scaling with externally fitted statistics
//!
//! This pipeline never fits a scaler. `StandardScaler` only applies
//! `(x - mean) / scale` using statistics loaded from an artifact.

use crate::error::{PredictorError, Result};
use crate::types::{Feature, FeatureVector, ProcessedRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A fitted, read-only feature transform
pub trait FeatureScaler: Send + Sync {
    /// Feature columns this scaler rewrites; others pass through
    fn columns(&self) -> &[Feature];

    /// Transform one time step in place
    fn transform_vector(&self, features: &mut FeatureVector) -> Result<()>;
}

/// On-disk layout of a fitted standard scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Per-column standardization with fitted mean and scale
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    columns: Vec<Feature>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Build from fitted statistics, validating them against the feature layout
    pub fn from_artifact(artifact: ScalerArtifact) -> Result<Self> {
        let n = artifact.feature_names.len();
        if artifact.mean.len() != n || artifact.scale.len() != n {
            return Err(PredictorError::ScalingError(format!(
                "{} feature names but {} means and {} scales",
                n,
                artifact.mean.len(),
                artifact.scale.len()
            )));
        }

        let mut columns = Vec::with_capacity(n);
        for name in &artifact.feature_names {
            let feature = Feature::from_name(name).ok_or_else(|| {
                PredictorError::ScalingError(format!("Records have no feature column '{}'", name))
            })?;
            if columns.contains(&feature) {
                return Err(PredictorError::ScalingError(format!(
                    "Feature column '{}' listed twice",
                    name
                )));
            }
            columns.push(feature);
        }

        for (name, (&mean, &scale)) in artifact
            .feature_names
            .iter()
            .zip(artifact.mean.iter().zip(artifact.scale.iter()))
        {
            if !mean.is_finite() {
                return Err(PredictorError::ScalingError(format!(
                    "Non-finite mean for '{}'",
                    name
                )));
            }
            if !scale.is_finite() || scale == 0.0 {
                return Err(PredictorError::ScalingError(format!(
                    "Invalid scale {} for '{}'",
                    scale, name
                )));
            }
        }

        Ok(Self {
            columns,
            mean: artifact.mean,
            scale: artifact.scale,
        })
    }

    /// Load a JSON scaler artifact
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let artifact: ScalerArtifact = serde_json::from_str(&contents)?;
        log::info!(
            "Loaded scaler for {} feature columns from {}",
            artifact.feature_names.len(),
            path.display()
        );
        Self::from_artifact(artifact)
    }

    /// Scaler that leaves every column untouched
    pub fn identity() -> Self {
        Self {
            columns: Vec::new(),
            mean: Vec::new(),
            scale: Vec::new(),
        }
    }
}

impl FeatureScaler for StandardScaler {
    fn columns(&self) -> &[Feature] {
        &self.columns
    }

    fn transform_vector(&self, features: &mut FeatureVector) -> Result<()> {
        for (i, &feature) in self.columns.iter().enumerate() {
            let value = features.get(feature);
            features.set(feature, (value - self.mean[i]) / self.scale[i]);
        }
        Ok(())
    }
}

/// Apply a fitted scaler to the feature columns of every record
///
/// Dates, stocks and raw prices are left as they are. Fails without returning
/// partial output.
pub fn scale_records(
    records: &[ProcessedRecord],
    scaler: &dyn FeatureScaler,
) -> Result<Vec<ProcessedRecord>> {
    let scaled = records
        .iter()
        .map(|record| {
            let mut out = record.clone();
            scaler.transform_vector(&mut out.features)?;
            if !out.features.is_finite() {
                return Err(PredictorError::ScalingError(format!(
                    "Non-finite scaled features on {}",
                    record.date
                )));
            }
            Ok(out)
        })
        .collect::<Result<Vec<_>>>()?;

    log::debug!(
        "Scaled {} columns on {} records",
        scaler.columns().len(),
        scaled.len()
    );

    Ok(scaled)
}
