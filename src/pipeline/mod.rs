//! Feature engineering, windowing, inference and ranking

pub mod encoding;
pub mod engine;
pub mod features;
pub mod model;
pub mod results;
pub mod rolling;
pub mod scaler;
pub mod windows;

pub use encoding::StockEncoding;
pub use engine::{engineer_features, format_results, predict_windows, run, RawForecast};
pub use features::{FeatureEngineer, ProcessedFrame};
pub use model::{InferenceContext, LinearSequenceModel, Predictor, SequenceModel, WindowBatch};
pub use results::{log_return_to_return, PredictionResult, ResultFormatter, ResultSet, ResultSummary};
pub use rolling::{LogReturn, RollingMean, RollingStd};
pub use scaler::{scale_records, FeatureScaler, ScalerArtifact, StandardScaler};
pub use windows::{TargetMetadata, Window, WindowBuilder, WindowSet};
