//! # Scan Results
//!
//! Raw output of one run: every named scan with the rows it returned, in
//! the order the scans are configured. A scan that failed upstream is
//! present with an empty row list.

use crate::domain::entities::raw_match::RawMatch;
use serde::{Deserialize, Serialize};

/// Rows returned by one named scan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanOutput {
    /// Scan name.
    pub name: String,
    /// Rows in the order the screener returned them.
    pub matches: Vec<RawMatch>,
}

impl ScanOutput {
    /// Creates a scan output.
    #[must_use]
    pub fn new(name: impl Into<String>, matches: Vec<RawMatch>) -> Self {
        Self {
            name: name.into(),
            matches,
        }
    }

    /// Creates the output of a scan that produced nothing.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

/// Insertion-ordered `scan name -> rows` mapping.
///
/// # Examples
///
/// ```
/// use options_scanner::domain::entities::raw_match::RawMatch;
/// use options_scanner::domain::entities::scan_results::ScanResults;
///
/// let mut results = ScanResults::new();
/// results.insert("volume_breakout", vec![RawMatch::new("TCS", 1500.0, 1e6, 2.0, 2.0)]);
/// results.insert("rsi_momentum", vec![]);
///
/// assert_eq!(results.total_rows(), 1);
/// assert_eq!(results.names().collect::<Vec<_>>(), ["volume_breakout", "rsi_momentum"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanResults {
    scans: Vec<ScanOutput>,
}

impl ScanResults {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a scan, or replaces the rows of an existing scan with the
    /// same name while keeping its position.
    pub fn insert(&mut self, name: impl Into<String>, matches: Vec<RawMatch>) {
        let name = name.into();
        match self.scans.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.matches = matches,
            None => self.scans.push(ScanOutput::new(name, matches)),
        }
    }

    /// Returns the rows of a scan.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[RawMatch]> {
        self.scans
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.matches.as_slice())
    }

    /// Iterates scans in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ScanOutput> {
        self.scans.iter()
    }

    /// Scan names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scans.iter().map(|s| s.name.as_str())
    }

    /// Number of scans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    /// Returns true when no scan is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// Rows across all scans.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.scans.iter().map(|s| s.matches.len()).sum()
    }

    /// Returns true when every scan came back empty.
    #[must_use]
    pub fn all_empty(&self) -> bool {
        self.total_rows() == 0
    }
}

impl FromIterator<ScanOutput> for ScanResults {
    fn from_iter<I: IntoIterator<Item = ScanOutput>>(iter: I) -> Self {
        let mut results = Self::new();
        for scan in iter {
            results.insert(scan.name, scan.matches);
        }
        results
    }
}

impl<'a> IntoIterator for &'a ScanResults {
    type Item = &'a ScanOutput;
    type IntoIter = std::slice::Iter<'a, ScanOutput>;

    fn into_iter(self) -> Self::IntoIter {
        self.scans.iter()
    }
}
