//! # Numeric Parse Policies
//!
//! Turning [`RawNumber`] columns into `f64`.
//!
//! Production runs use [`LenientParse`]: anything that is not a number
//! degrades to `0.0` and the row is kept. [`StrictParse`] rejects such
//! values instead, which lets tests catch malformed fixtures.

use crate::domain::entities::raw_match::RawNumber;
use std::fmt;
use thiserror::Error;

/// A column value that a policy refused to convert.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("column `{column}` is not numeric: {value}")]
pub struct NumericParseError {
    /// Column name.
    pub column: &'static str,
    /// Offending value, rendered for diagnostics.
    pub value: String,
}

impl NumericParseError {
    fn new(column: &'static str, value: &RawNumber) -> Self {
        let value = match value {
            RawNumber::Number(n) => n.to_string(),
            RawNumber::Text(s) => format!("{s:?}"),
            RawNumber::Missing => "<missing>".to_string(),
            RawNumber::Other(v) => v.to_string(),
        };
        Self { column, value }
    }
}

/// Strategy for converting a raw column into a number.
pub trait NumericParsePolicy: Send + Sync + fmt::Debug {
    /// Converts `value` read from `column`.
    ///
    /// # Errors
    ///
    /// Returns [`NumericParseError`] when the policy rejects the value.
    fn parse(&self, column: &'static str, value: &RawNumber) -> Result<f64, NumericParseError>;

    /// Returns the name of this policy.
    fn name(&self) -> &'static str;
}

/// Strips thousands separators and surrounding whitespace, then parses.
fn parse_text(text: &str) -> Option<f64> {
    text.replace(',', "").trim().parse::<f64>().ok()
}

/// Coerces anything unparsable to `0.0`.
///
/// # Examples
///
/// ```
/// use options_scanner::domain::entities::raw_match::RawNumber;
/// use options_scanner::domain::services::numeric::{LenientParse, NumericParsePolicy};
///
/// let policy = LenientParse;
/// assert_eq!(policy.parse("close", &RawNumber::from("1,234.5")), Ok(1234.5));
/// assert_eq!(policy.parse("close", &RawNumber::from("n/a")), Ok(0.0));
/// assert_eq!(policy.parse("close", &RawNumber::Missing), Ok(0.0));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientParse;

impl NumericParsePolicy for LenientParse {
    fn parse(&self, _column: &'static str, value: &RawNumber) -> Result<f64, NumericParseError> {
        Ok(match value {
            RawNumber::Number(n) => *n,
            RawNumber::Text(s) => parse_text(s).unwrap_or(0.0),
            RawNumber::Missing | RawNumber::Other(_) => 0.0,
        })
    }

    fn name(&self) -> &'static str {
        "Lenient"
    }
}

/// Rejects missing, unparsable and non-finite values.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictParse;

impl NumericParsePolicy for StrictParse {
    fn parse(&self, column: &'static str, value: &RawNumber) -> Result<f64, NumericParseError> {
        let parsed = match value {
            RawNumber::Number(n) => Some(*n),
            RawNumber::Text(s) => parse_text(s),
            RawNumber::Missing | RawNumber::Other(_) => None,
        };
        parsed
            .filter(|n| n.is_finite())
            .ok_or_else(|| NumericParseError::new(column, value))
    }

    fn name(&self) -> &'static str {
        "Strict"
    }
}
