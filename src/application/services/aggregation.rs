//! # Scan Aggregation
//!
//! Merges the per-scan row lists of one run into one record per symbol.
//!
//! Scans are walked in configured order and rows in the order the screener
//! returned them. Each symbol is normalized (trimmed, upper-cased) before
//! lookup, so `"tcs"` and `" TCS "` land on the same record.
//!
//! Two policies are pluggable:
//!
//! - [`MergePolicy`] decides which numeric fields a record keeps when a
//!   later scan reports the same symbol. The default, [`FirstSightingWins`],
//!   keeps the first scan's values and discards the rest.
//! - [`NumericParsePolicy`] converts the untrusted numeric columns. The
//!   default, [`LenientParse`], turns garbage into `0.0`.

use crate::domain::entities::aggregated_record::{AggregatedRecord, MarketSnapshot};
use crate::domain::entities::raw_match::RawMatch;
use crate::domain::entities::scan_results::ScanResults;
use crate::domain::services::numeric::{LenientParse, NumericParseError, NumericParsePolicy};
use crate::domain::value_objects::symbol::Symbol;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decides the numeric fields of a record on a repeat sighting.
pub trait MergePolicy: Send + Sync + fmt::Debug {
    /// Returns the snapshot the record keeps.
    ///
    /// # Arguments
    ///
    /// * `current` - Values the record holds now
    /// * `incoming` - Values from the new sighting
    /// * `prior_hits` - Scans that reported the symbol before this one
    fn merge(
        &self,
        current: &MarketSnapshot,
        incoming: &MarketSnapshot,
        prior_hits: usize,
    ) -> MarketSnapshot;

    /// Returns the name of this policy.
    fn name(&self) -> &'static str;
}

/// Keeps the values of the first scan that reported the symbol.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSightingWins;

impl MergePolicy for FirstSightingWins {
    fn merge(
        &self,
        current: &MarketSnapshot,
        _incoming: &MarketSnapshot,
        _prior_hits: usize,
    ) -> MarketSnapshot {
        *current
    }

    fn name(&self) -> &'static str {
        "FirstSightingWins"
    }
}

/// Overwrites with the values of the latest scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatestWins;

impl MergePolicy for LatestWins {
    fn merge(
        &self,
        _current: &MarketSnapshot,
        incoming: &MarketSnapshot,
        _prior_hits: usize,
    ) -> MarketSnapshot {
        *incoming
    }

    fn name(&self) -> &'static str {
        "LatestWins"
    }
}

/// Keeps the field-wise mean over all sightings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningAverage;

impl MergePolicy for RunningAverage {
    fn merge(
        &self,
        current: &MarketSnapshot,
        incoming: &MarketSnapshot,
        prior_hits: usize,
    ) -> MarketSnapshot {
        let n = prior_hits.max(1) as f64;
        let mean = |c: f64, i: f64| (c * n + i) / (n + 1.0);
        MarketSnapshot::new(
            mean(current.close, incoming.close),
            mean(current.volume, incoming.volume),
            mean(current.volume_ratio, incoming.volume_ratio),
            mean(current.change_pct, incoming.change_pct),
        )
    }

    fn name(&self) -> &'static str {
        "RunningAverage"
    }
}

/// Row accounting for one aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationStats {
    /// Rows inspected across all scans.
    pub rows_seen: usize,
    /// Rows without a usable symbol.
    pub blank_symbols: usize,
    /// Rows rejected by the numeric parse policy.
    pub rejected_rows: usize,
    /// Rows repeating a symbol already reported by the same scan.
    pub duplicate_rows: usize,
}

/// Records of one run, in first-sighting order, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct AggregatedSet {
    records: Vec<AggregatedRecord>,
    index: HashMap<Symbol, usize>,
    stats: AggregationStats,
}

impl AggregatedSet {
    /// Number of distinct symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when no symbol was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks a record up by (already normalized) symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&AggregatedRecord> {
        self.index
            .get(symbol)
            .and_then(|&i| self.records.get(i))
    }

    /// Iterates records in first-sighting order.
    pub fn iter(&self) -> impl Iterator<Item = &AggregatedRecord> {
        self.records.iter()
    }

    /// Symbols in first-sighting order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.records.iter().map(AggregatedRecord::symbol)
    }

    /// Row accounting.
    #[must_use]
    pub fn stats(&self) -> &AggregationStats {
        &self.stats
    }

    /// Keeps only records whose symbol is in `eligible`, preserving order.
    #[must_use]
    pub fn retain_eligible(self, eligible: &HashSet<Symbol>) -> Self {
        let before = self.records.len();
        let records: Vec<AggregatedRecord> = self
            .records
            .into_iter()
            .filter(|r| eligible.contains(r.symbol()))
            .collect();
        info!(
            kept = records.len(),
            removed = before - records.len(),
            "eligibility filter applied"
        );
        Self::from_records(records, self.stats)
    }

    /// Consumes the set, returning the records in first-sighting order.
    #[must_use]
    pub fn into_records(self) -> Vec<AggregatedRecord> {
        self.records
    }

    fn from_records(records: Vec<AggregatedRecord>, stats: AggregationStats) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.symbol().clone(), i))
            .collect();
        Self {
            records,
            index,
            stats,
        }
    }
}

/// Merges scan outputs into per-symbol records.
///
/// # Examples
///
/// ```
/// use options_scanner::application::services::aggregation::Aggregator;
/// use options_scanner::domain::entities::raw_match::RawMatch;
/// use options_scanner::domain::entities::scan_results::ScanResults;
///
/// let mut results = ScanResults::new();
/// results.insert("volume_breakout", vec![RawMatch::new("tcs", 1500.0, 1e6, 2.0, 2.0)]);
/// results.insert("rsi_momentum", vec![RawMatch::new("TCS ", 1510.0, 1e6, 2.1, 2.2)]);
///
/// let set = Aggregator::default().aggregate(&results);
/// let tcs = set.get("TCS").unwrap();
/// assert_eq!(tcs.hit_count(), 2);
/// assert_eq!(tcs.close(), 1500.0);
/// ```
#[derive(Debug, Clone)]
pub struct Aggregator {
    merge_policy: Arc<dyn MergePolicy>,
    parse_policy: Arc<dyn NumericParsePolicy>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(Arc::new(FirstSightingWins), Arc::new(LenientParse))
    }
}

impl Aggregator {
    /// Creates an aggregator with explicit policies.
    #[must_use]
    pub fn new(
        merge_policy: Arc<dyn MergePolicy>,
        parse_policy: Arc<dyn NumericParsePolicy>,
    ) -> Self {
        Self {
            merge_policy,
            parse_policy,
        }
    }

    /// Replaces the merge policy.
    #[must_use]
    pub fn with_merge_policy(mut self, policy: Arc<dyn MergePolicy>) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Replaces the numeric parse policy.
    #[must_use]
    pub fn with_parse_policy(mut self, policy: Arc<dyn NumericParsePolicy>) -> Self {
        self.parse_policy = policy;
        self
    }

    /// Name of the merge policy in use.
    #[must_use]
    pub fn merge_policy_name(&self) -> &'static str {
        self.merge_policy.name()
    }

    /// Name of the parse policy in use.
    #[must_use]
    pub fn parse_policy_name(&self) -> &'static str {
        self.parse_policy.name()
    }

    /// Merges all scans.
    ///
    /// Never fails: blank symbols and rows the parse policy rejects are
    /// skipped and counted in [`AggregationStats`].
    #[must_use]
    pub fn aggregate(&self, results: &ScanResults) -> AggregatedSet {
        let mut records: Vec<AggregatedRecord> = Vec::new();
        let mut index: HashMap<Symbol, usize> = HashMap::new();
        let mut stats = AggregationStats::default();

        for scan in results {
            for row in &scan.matches {
                stats.rows_seen += 1;

                let Some(symbol) = Symbol::parse(row.raw_symbol()) else {
                    stats.blank_symbols += 1;
                    continue;
                };

                let snapshot = match self.snapshot_of(row) {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        warn!(scan = %scan.name, %symbol, error = %e, "row rejected");
                        stats.rejected_rows += 1;
                        continue;
                    }
                };

                match index.get(&symbol).and_then(|&i| records.get_mut(i)) {
                    Some(record) => {
                        let prior_hits = record.hit_count();
                        if !record.record_hit(&scan.name) {
                            stats.duplicate_rows += 1;
                            continue;
                        }
                        let merged = self
                            .merge_policy
                            .merge(record.snapshot(), &snapshot, prior_hits);
                        record.set_snapshot(merged);
                    }
                    None => {
                        index.insert(symbol.clone(), records.len());
                        records.push(AggregatedRecord::first_sighting(
                            symbol,
                            snapshot,
                            scan.name.as_str(),
                        ));
                    }
                }
            }
        }

        debug!(
            rows_seen = stats.rows_seen,
            blank_symbols = stats.blank_symbols,
            rejected_rows = stats.rejected_rows,
            duplicate_rows = stats.duplicate_rows,
            merge_policy = self.merge_policy.name(),
            "aggregation stats"
        );
        info!(unique = records.len(), "aggregated unique symbols across all scans");

        AggregatedSet {
            records,
            index,
            stats,
        }
    }

    fn snapshot_of(&self, row: &RawMatch) -> Result<MarketSnapshot, NumericParseError> {
        let p = &self.parse_policy;
        Ok(MarketSnapshot::new(
            p.parse("close", &row.close)?,
            p.parse("volume", &row.volume)?,
            p.parse("per_chg_vol", &row.volume_ratio)?,
            p.parse("per_chg", &row.change_pct)?,
        ))
    }
}
