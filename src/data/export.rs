//! CSV writers for ranked predictions and engineered features

use crate::error::Result;
use crate::pipeline::features::ProcessedFrame;
use crate::pipeline::results::ResultSet;
use crate::types::Feature;
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column header of the predicted return percent
pub const PREDICTED_RETURN_PERCENT: &str = "Predicted Return (%)";

/// Write ranked predictions as CSV
///
/// The basic layout is Date, Stock, Predicted Return (%). `detailed` adds the
/// target close, predicted log return and predicted simple return.
pub fn write_results<W: Write>(results: &ResultSet, output: W, detailed: bool) -> Result<()> {
    let mut wtr = Writer::from_writer(output);

    if detailed {
        wtr.write_record([
            "Date",
            "Stock",
            "Close",
            "Predicted Log Return",
            "Predicted Return",
            PREDICTED_RETURN_PERCENT,
        ])?;
    } else {
        wtr.write_record(["Date", "Stock", PREDICTED_RETURN_PERCENT])?;
    }

    for r in results.results() {
        let date = r.date.format("%Y-%m-%d").to_string();
        let percent = r.predicted_return_percent.to_string();
        if detailed {
            wtr.write_record([
                date.as_str(),
                r.stock.as_str(),
                r.close.to_string().as_str(),
                r.predicted_log_return.to_string().as_str(),
                r.predicted_return.to_string().as_str(),
                percent.as_str(),
            ])?;
        } else {
            wtr.write_record([date.as_str(), r.stock.as_str(), percent.as_str()])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Write ranked predictions to a file
pub fn write_results_path(results: &ResultSet, path: &Path, detailed: bool) -> Result<()> {
    let file = File::create(path)?;
    write_results(results, file, detailed)?;
    log::info!("Wrote {} predictions to {}", results.len(), path.display());
    Ok(())
}

/// Write engineered feature rows as CSV, stocks decoded to their labels
pub fn write_features<W: Write>(frame: &ProcessedFrame, output: W) -> Result<()> {
    let mut wtr = Writer::from_writer(output);

    let mut header = vec!["Date", "Stock", "Open", "High", "Low", "Close", "Volume"];
    header.extend(Feature::ALL.iter().map(|f| f.name()));
    wtr.write_record(&header)?;

    for record in &frame.records {
        let mut row = vec![
            record.date.format("%Y-%m-%d").to_string(),
            frame.label(record.stock).unwrap_or_default().to_string(),
            record.open.to_string(),
            record.high.to_string(),
            record.low.to_string(),
            record.close.to_string(),
            record.volume.to_string(),
        ];
        row.extend(record.features.as_slice().iter().map(|v| v.to_string()));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encoding::StockEncoding;
    use crate::pipeline::results::ResultFormatter;
    use crate::pipeline::windows::TargetMetadata;
    use chrono::NaiveDate;

    fn ranked() -> ResultSet {
        let enc = StockEncoding::from_labels(["AAPL", "MSFT"]);
        let targets = vec![
            TargetMetadata {
                date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                stock: 0,
                close: 180.0,
            },
            TargetMetadata {
                date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                stock: 1,
                close: 400.0,
            },
        ];
        ResultFormatter::new(&enc).format(&targets, &[0.0, 0.5f64.ln_1p()]).unwrap()
    }

    #[test]
    fn test_basic_layout() {
        let mut buf = Vec::new();
        write_results(&ranked(), &mut buf, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,Stock,Predicted Return (%)");
        assert!(lines[1].starts_with("2024-02-01,MSFT,"));
        assert_eq!(lines[2], "2024-02-01,AAPL,0");
    }

    #[test]
    fn test_detailed_layout() {
        let mut buf = Vec::new();
        write_results(&ranked(), &mut buf, true).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with(
            "Date,Stock,Close,Predicted Log Return,Predicted Return,Predicted Return (%)\n"
        ));
        assert_eq!(text.lines().count(), 3);
    }
}
