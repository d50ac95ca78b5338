//! Tabular input and output

pub mod export;
pub mod loader;

pub use export::{write_features, write_results, write_results_path, PREDICTED_RETURN_PERCENT};
pub use loader::{parse_date, ColumnIndex, CsvBarReader};
