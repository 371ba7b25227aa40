//! # Directional Hint
//!
//! Coarse bias attached to each ranked candidate.
//!
//! A hint is a starting point for research, not a trade instruction. It
//! serializes to the human-readable label consumers of `/analyze` see.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional bias derived from price change and relative volume.
///
/// # Examples
///
/// ```
/// use options_scanner::domain::value_objects::hint::DirectionalHint;
///
/// assert_eq!(
///     DirectionalHint::Bullish.label(),
///     "Bullish — consider ATM/OTM Call (CE)"
/// );
/// assert!(DirectionalHint::Neutral.is_neutral());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionalHint {
    /// Strong up move on heavy volume.
    #[serde(rename = "Bullish — consider ATM/OTM Call (CE)")]
    Bullish,
    /// Strong down move on heavy volume.
    #[serde(rename = "Bearish — consider ATM/OTM Put (PE)")]
    Bearish,
    /// Anything else.
    #[serde(rename = "Neutral — watch price action; Straddle if IV is low")]
    Neutral,
}

impl DirectionalHint {
    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bullish => "Bullish — consider ATM/OTM Call (CE)",
            Self::Bearish => "Bearish — consider ATM/OTM Put (PE)",
            Self::Neutral => "Neutral — watch price action; Straddle if IV is low",
        }
    }

    /// Returns true for the neutral hint.
    #[inline]
    #[must_use]
    pub const fn is_neutral(self) -> bool {
        matches!(self, Self::Neutral)
    }
}

impl fmt::Display for DirectionalHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
