//! # Raw Scanner Match
//!
//! One row of one scan's result set, exactly as the screener returned it.
//!
//! Numeric columns are not trusted: the screener sends numbers, numeric
//! strings with thousands separators, `null`, or leaves the column out
//! entirely. [`RawNumber`] keeps the value as received so that the
//! aggregation step can apply an explicit parse policy.

use serde::{Deserialize, Serialize};

/// A numeric column as received from the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    /// A JSON number.
    Number(f64),
    /// A string that may hold a number (e.g. `"1,234.50"`).
    Text(String),
    /// `null` or an absent column.
    #[default]
    Missing,
    /// Any other JSON value (bool, array, object).
    Other(serde_json::Value),
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A single scanner hit for one symbol.
///
/// Field names on the wire follow the Chartink screener payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawMatch {
    /// Ticker as reported by the scanner (not yet normalized).
    #[serde(rename = "nsecode", default)]
    pub symbol: Option<String>,
    /// Last traded price.
    #[serde(default)]
    pub close: RawNumber,
    /// Traded volume.
    #[serde(default)]
    pub volume: RawNumber,
    /// Relative volume figure.
    #[serde(rename = "per_chg_vol", default)]
    pub volume_ratio: RawNumber,
    /// Percent price change on the day.
    #[serde(rename = "per_chg", default)]
    pub change_pct: RawNumber,
}

impl RawMatch {
    /// Creates a match with numeric columns.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        close: f64,
        volume: f64,
        volume_ratio: f64,
        change_pct: f64,
    ) -> Self {
        Self {
            symbol: Some(symbol.into()),
            close: RawNumber::Number(close),
            volume: RawNumber::Number(volume),
            volume_ratio: RawNumber::Number(volume_ratio),
            change_pct: RawNumber::Number(change_pct),
        }
    }

    /// Returns the raw ticker, or an empty string when absent.
    #[must_use]
    pub fn raw_symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_chartink_row() {
        let json = r#"{
            "sr": 1,
            "nsecode": "RELIANCE",
            "name": "Reliance Industries Limited",
            "bsecode": "500325",
            "per_chg": 1.8,
            "close": "2,450.50",
            "volume": 1234567,
            "per_chg_vol": null
        }"#;
        let row: RawMatch = serde_json::from_str(json).unwrap();

        assert_eq!(row.raw_symbol(), "RELIANCE");
        assert_eq!(row.close, RawNumber::Text("2,450.50".to_string()));
        assert_eq!(row.volume, RawNumber::Number(1_234_567.0));
        assert_eq!(row.volume_ratio, RawNumber::Missing);
        assert_eq!(row.change_pct, RawNumber::Number(1.8));
    }

    #[test]
    fn missing_columns_default() {
        let row: RawMatch = serde_json::from_str("{}").unwrap();
        assert_eq!(row.raw_symbol(), "");
        assert_eq!(row.close, RawNumber::Missing);
    }

    #[test]
    fn odd_values_are_kept() {
        let row: RawMatch = serde_json::from_str(r#"{"nsecode": "X", "close": true}"#).unwrap();
        assert!(matches!(row.close, RawNumber::Other(_)));
    }
}
