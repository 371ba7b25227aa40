//! # Scan Fetcher Trait
//!
//! Port definition for technical-scan sources.
//!
//! A [`ScanFetcher`] runs a list of [`NamedQuery`] values against a
//! screener and returns the rows each one matched. Fetchers never fail as
//! a whole: a query that cannot be run contributes an empty row list, so
//! callers can always aggregate whatever came back.

use crate::domain::entities::scan_results::ScanResults;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A screener query with a stable display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedQuery {
    /// Name reported in `scanners_hit`.
    pub name: String,
    /// Screener clause text.
    pub clause: String,
}

impl NamedQuery {
    /// Creates a named query.
    #[must_use]
    pub fn new(name: impl Into<String>, clause: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clause: clause.into(),
        }
    }
}

impl fmt::Display for NamedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NamedQuery({})", self.name)
    }
}

/// Trait for scan sources.
///
/// # Contract
///
/// The returned [`ScanResults`] holds exactly one entry per query, in the
/// order of `queries`. Failed queries are logged by the implementation and
/// reported as empty.
#[async_trait]
pub trait ScanFetcher: Send + Sync + fmt::Debug {
    /// Runs every query and collects the rows.
    async fn fetch_all(&self, queries: &[NamedQuery]) -> ScanResults;

    /// Returns the name of this fetcher.
    fn name(&self) -> &'static str;
}
