//! CSV reader for daily OHLCV bars

use crate::config::CsvFormat;
use crate::error::{PredictorError, Result};
use crate::types::{Date, RawRecord, REQUIRED_COLUMNS};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Date formats tried after the configured one
const FALLBACK_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Datetime formats whose time part is discarded
const FALLBACK_DATETIME_FORMATS: [&str; 3] =
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// Column positions of the required fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub date: usize,
    pub stock: usize,
    pub open: usize,
    pub high: usize,
    pub low: usize,
    pub close: usize,
    pub volume: usize,
}

impl ColumnIndex {
    /// Locate required columns, failing on the first missing one
    ///
    /// Missing columns are reported by their canonical name in the order
    /// Date, Stock, Open, High, Low, Close, Volume.
    pub fn from_headers(headers: &StringRecord, format: &CsvFormat) -> Result<Self> {
        let mut positions = [0usize; 7];
        for (slot, (name, canonical)) in format.columns().iter().zip(REQUIRED_COLUMNS).enumerate() {
            positions[slot] = headers
                .iter()
                .position(|h| h.trim() == *name)
                .ok_or_else(|| PredictorError::MissingColumn(canonical.to_string()))?;
        }

        Ok(Self {
            date: positions[0],
            stock: positions[1],
            open: positions[2],
            high: positions[3],
            low: positions[4],
            close: positions[5],
            volume: positions[6],
        })
    }
}

/// Reads raw bars from CSV input
pub struct CsvBarReader {
    format: CsvFormat,
}

impl CsvBarReader {
    /// Create reader with the default format
    pub fn new() -> Self {
        Self {
            format: CsvFormat::default(),
        }
    }

    /// Create with custom format
    pub fn with_format(format: CsvFormat) -> Self {
        Self { format }
    }

    /// Read a CSV file
    pub fn read_path(&self, path: &Path) -> Result<Vec<RawRecord>> {
        let file = File::open(path)?;
        let records = self.read(file)?;
        log::info!("Read {} bars from {}", records.len(), path.display());
        Ok(records)
    }

    /// Read CSV from any reader
    pub fn read<R: Read>(&self, input: R) -> Result<Vec<RawRecord>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.format.delimiter as u8)
            .trim(csv::Trim::All)
            .from_reader(input);

        let headers = rdr.headers()?.clone();
        let columns = ColumnIndex::from_headers(&headers, &self.format)?;

        let mut records = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            // Header is line 1
            let row = i + 2;
            records.push(self.parse_record(&record, &columns, row)?);
        }

        Ok(records)
    }

    fn parse_record(&self, record: &StringRecord, columns: &ColumnIndex, row: usize) -> Result<RawRecord> {
        let date_str = field(record, columns.date, "Date", row)?;
        let date = parse_date(date_str, &self.format.date_format)
            .ok_or_else(|| malformed("Date", row, date_str))?;

        Ok(RawRecord {
            date,
            stock: field(record, columns.stock, "Stock", row)?.to_string(),
            open: number(record, columns.open, "Open", row)?,
            high: number(record, columns.high, "High", row)?,
            low: number(record, columns.low, "Low", row)?,
            close: number(record, columns.close, "Close", row)?,
            volume: number(record, columns.volume, "Volume", row)?,
        })
    }
}

impl Default for CsvBarReader {
    fn default() -> Self {
        Self::new()
    }
}

fn field<'r>(record: &'r StringRecord, idx: usize, column: &str, row: usize) -> Result<&'r str> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        other => Err(malformed(column, row, other.unwrap_or(""))),
    }
}

fn number(record: &StringRecord, idx: usize, column: &str, row: usize) -> Result<f64> {
    let value = field(record, idx, column, row)?;
    value.parse::<f64>().map_err(|_| malformed(column, row, value))
}

fn malformed(column: &str, row: usize, value: &str) -> PredictorError {
    PredictorError::MalformedField {
        column: column.to_string(),
        row,
        value: value.to_string(),
    }
}

/// Parse a calendar date, trying `preferred` first
pub fn parse_date(value: &str, preferred: &str) -> Option<Date> {
    if let Ok(date) = NaiveDate::parse_from_str(value, preferred) {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, preferred) {
        return Some(dt.date());
    }
    FALLBACK_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            FALLBACK_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Date,Stock,Open,High,Low,Close,Volume\n\
                          2020-01-02,AAPL,300.35,300.58,298.32,300.35,33911800\n\
                          2020-01-03,AAPL,297.15,300.58,297.14,297.43,36028600\n\
                          2020-01-02,MSFT,160.62,160.73,159.98,160.62,22622100\n";

    #[test]
    fn test_read_sample() {
        let records = CsvBarReader::new().read(SAMPLE.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].stock, "AAPL");
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!(records[2].close, 160.62);
        assert_eq!(records[1].volume, 36028600.0);
    }

    #[test]
    fn test_columns_in_any_order() {
        let csv = "Volume,Close,Low,High,Open,Stock,Date\n100,10,9,11,10,X,2021-05-04\n";
        let records = CsvBarReader::new().read(csv.as_bytes()).unwrap();

        assert_eq!(records[0].stock, "X");
        assert_eq!(records[0].high, 11.0);
        assert_eq!(records[0].volume, 100.0);
    }

    #[test]
    fn test_missing_column_named() {
        let csv = "Date,Stock,Open,High,Low,Volume\n2020-01-02,A,1,1,1,1\n";
        let err = CsvBarReader::new().read(csv.as_bytes()).unwrap_err();

        assert!(matches!(err, PredictorError::MissingColumn(ref c) if c == "Close"));
        assert_eq!(err.to_string(), "Missing required column: Close");
    }

    #[test]
    fn test_each_required_column_named_when_missing() {
        for missing in REQUIRED_COLUMNS {
            let header: Vec<&str> = REQUIRED_COLUMNS
                .iter()
                .copied()
                .filter(|c| *c != missing)
                .collect();
            let csv = format!("{}\n", header.join(","));

            let err = CsvBarReader::new().read(csv.as_bytes()).unwrap_err();
            assert!(
                matches!(err, PredictorError::MissingColumn(ref c) if c == missing),
                "dropping {} gave {}",
                missing,
                err
            );
        }
    }

    #[test]
    fn test_first_missing_column_reported() {
        let csv = "Date,Open,High,Low\n";
        let err = CsvBarReader::new().read(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PredictorError::MissingColumn(ref c) if c == "Stock"));
    }

    #[test]
    fn test_malformed_number() {
        let csv = "Date,Stock,Open,High,Low,Close,Volume\n2020-01-02,A,1,1,1,abc,1\n";
        let err = CsvBarReader::new().read(csv.as_bytes()).unwrap_err();

        match err {
            PredictorError::MalformedField { column, row, value } => {
                assert_eq!(column, "Close");
                assert_eq!(row, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_format() {
        let csv = "Day;Ticker;O;H;L;C;V\n01/02/2020;AAPL;1;2;0.5;1.5;10\n";
        let format = CsvFormat {
            date_column: "Day".to_string(),
            stock_column: "Ticker".to_string(),
            open_column: "O".to_string(),
            high_column: "H".to_string(),
            low_column: "L".to_string(),
            close_column: "C".to_string(),
            volume_column: "V".to_string(),
            date_format: "%m/%d/%Y".to_string(),
            delimiter: ';',
        };

        let records = CsvBarReader::with_format(format).read(csv.as_bytes()).unwrap();
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!(records[0].close, 1.5);
    }

    #[test]
    fn test_parse_date_fallbacks() {
        let expected = NaiveDate::from_ymd_opt(2022, 3, 4);

        assert_eq!(parse_date("2022-03-04", "%d.%m.%Y"), expected);
        assert_eq!(parse_date("2022-03-04 16:00:00", "%Y-%m-%d"), expected);
        assert_eq!(parse_date("04.03.2022", "%d.%m.%Y"), expected);
        assert_eq!(parse_date("yesterday", "%Y-%m-%d"), None);
    }
}
