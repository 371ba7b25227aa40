//! # Aggregated Record
//!
//! One candidate per distinct symbol across every scan of a single run.
//!
//! The record is created on the first sighting of a symbol, picks up one
//! hit per additional scan that reports it, and is finally annotated with
//! a composite score and a directional hint. Records live for one run only.

use crate::domain::value_objects::hint::DirectionalHint;
use crate::domain::value_objects::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric market fields carried by a record.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Last traded price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
    /// Relative volume figure.
    pub volume_ratio: f64,
    /// Percent price change on the day.
    pub change_pct: f64,
}

impl MarketSnapshot {
    /// Creates a snapshot.
    #[must_use]
    pub const fn new(close: f64, volume: f64, volume_ratio: f64, change_pct: f64) -> Self {
        Self {
            close,
            volume,
            volume_ratio,
            change_pct,
        }
    }
}

/// A symbol merged across all scans of one run.
///
/// # Invariants
///
/// - `hit_count() == scanners_hit().len()`; the count is derived, never stored
/// - `scanners_hit` holds each scan name at most once, in execution order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    symbol: Symbol,
    snapshot: MarketSnapshot,
    scanners_hit: Vec<String>,
    score: Option<f64>,
    hint: Option<DirectionalHint>,
}

impl AggregatedRecord {
    /// Creates a record from its first sighting.
    #[must_use]
    pub fn first_sighting(
        symbol: Symbol,
        snapshot: MarketSnapshot,
        scanner: impl Into<String>,
    ) -> Self {
        Self {
            symbol,
            snapshot,
            scanners_hit: vec![scanner.into()],
            score: None,
            hint: None,
        }
    }

    /// Records another sighting by `scanner`.
    ///
    /// Returns `false` (and changes nothing) when this scan already
    /// reported the symbol.
    pub fn record_hit(&mut self, scanner: &str) -> bool {
        if self.scanners_hit.iter().any(|s| s == scanner) {
            return false;
        }
        self.scanners_hit.push(scanner.to_string());
        true
    }

    /// Replaces the numeric fields.
    pub fn set_snapshot(&mut self, snapshot: MarketSnapshot) {
        self.snapshot = snapshot;
    }

    /// Attaches the composite score.
    pub fn set_score(&mut self, score: f64) {
        self.score = Some(score);
    }

    /// Attaches the directional hint.
    pub fn set_hint(&mut self, hint: DirectionalHint) {
        self.hint = Some(hint);
    }

    /// Returns the symbol.
    #[inline]
    #[must_use]
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Returns the numeric fields.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &MarketSnapshot {
        &self.snapshot
    }

    /// Last traded price.
    #[inline]
    #[must_use]
    pub fn close(&self) -> f64 {
        self.snapshot.close
    }

    /// Traded volume.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.snapshot.volume
    }

    /// Relative volume figure.
    #[inline]
    #[must_use]
    pub fn volume_ratio(&self) -> f64 {
        self.snapshot.volume_ratio
    }

    /// Percent price change.
    #[inline]
    #[must_use]
    pub fn change_pct(&self) -> f64 {
        self.snapshot.change_pct
    }

    /// Number of distinct scans that reported this symbol.
    #[inline]
    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.scanners_hit.len()
    }

    /// Scan names that reported this symbol, in execution order.
    #[inline]
    #[must_use]
    pub fn scanners_hit(&self) -> &[String] {
        &self.scanners_hit
    }

    /// Composite score, once scored.
    #[inline]
    #[must_use]
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    /// Directional hint, once derived.
    #[inline]
    #[must_use]
    pub fn hint(&self) -> Option<DirectionalHint> {
        self.hint
    }
}

impl fmt::Display for AggregatedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} close={:.2} hits={} [{}]",
            self.symbol,
            self.snapshot.close,
            self.hit_count(),
            self.scanners_hit.join(", ")
        )
    }
}
