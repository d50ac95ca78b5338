//! Stock identifier encode/decode table
//!
//! Codes are assigned once per invocation in ascending label order, so the
//! entity order of every downstream stage is reproducible from the input alone.

use crate::types::StockCode;
use hashbrown::HashMap;
use std::collections::BTreeSet;

/// Bidirectional mapping between stock labels and per-invocation codes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockEncoding {
    labels: Vec<String>,
    codes: HashMap<String, StockCode>,
}

impl StockEncoding {
    /// Build the table from every label that appears in the input
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unique: BTreeSet<&str> = labels.into_iter().collect();
        let labels: Vec<String> = unique.into_iter().map(str::to_string).collect();
        let codes = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i as StockCode))
            .collect();

        Self { labels, codes }
    }

    /// Code for a label
    pub fn encode(&self, label: &str) -> Option<StockCode> {
        self.codes.get(label).copied()
    }

    /// Label for a code
    pub fn decode(&self, code: StockCode) -> Option<&str> {
        self.labels.get(code as usize).map(|s| s.as_str())
    }

    /// Labels in code order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of distinct stocks
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when no stocks were seen
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_label_order() {
        let enc = StockEncoding::from_labels(["MSFT", "AAPL", "MSFT", "GOOG", "AAPL"]);

        assert_eq!(enc.len(), 3);
        assert_eq!(enc.encode("AAPL"), Some(0));
        assert_eq!(enc.encode("GOOG"), Some(1));
        assert_eq!(enc.encode("MSFT"), Some(2));
        assert_eq!(enc.encode("TSLA"), None);
    }

    #[test]
    fn test_decode_round_trip() {
        let enc = StockEncoding::from_labels(["b", "a", "c"]);

        for label in ["a", "b", "c"] {
            let code = enc.encode(label).unwrap();
            assert_eq!(enc.decode(code), Some(label));
        }
        assert_eq!(enc.decode(3), None);
    }

    #[test]
    fn test_empty_encoding() {
        let enc = StockEncoding::from_labels(std::iter::empty());
        assert!(enc.is_empty());
        assert!(enc.labels().is_empty());
    }
}
