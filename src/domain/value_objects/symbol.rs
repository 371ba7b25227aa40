//! # Symbol Value Object
//!
//! Normalized exchange ticker.
//!
//! Scanner rows and eligibility lists spell tickers inconsistently
//! (`"reliance"`, `" RELIANCE "`, `"Reliance"`). [`Symbol`] is the single
//! canonical form used as an aggregation key: trimmed and upper-cased.
//!
//! # Examples
//!
//! ```
//! use options_scanner::domain::value_objects::symbol::Symbol;
//!
//! let symbol = Symbol::parse(" reliance ").unwrap();
//! assert_eq!(symbol.as_str(), "RELIANCE");
//!
//! assert!(Symbol::parse("   ").is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A trimmed, upper-cased ticker symbol.
///
/// # Invariants
///
/// - Never empty
/// - No leading or trailing whitespace
/// - ASCII letters are upper-case
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Normalizes a raw ticker.
    ///
    /// Returns `None` when nothing is left after trimming.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_uppercase()))
    }

    /// Returns the symbol as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the symbol, returning the inner string.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when a blank string is converted into a [`Symbol`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("symbol must not be blank")]
pub struct BlankSymbolError;

impl TryFrom<String> for Symbol {
    type Error = BlankSymbolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(BlankSymbolError)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}
