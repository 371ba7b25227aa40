//! # In-Memory Scan Fetcher
//!
//! Canned [`ScanFetcher`] for tests and offline runs.

use crate::domain::entities::raw_match::RawMatch;
use crate::domain::entities::scan_results::{ScanOutput, ScanResults};
use crate::infrastructure::scanners::traits::{NamedQuery, ScanFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns preset rows per query name.
///
/// Queries with no preset rows come back empty, the same way a failed
/// upstream call would.
#[derive(Debug, Default)]
pub struct InMemoryScanFetcher {
    rows: HashMap<String, Vec<RawMatch>>,
    calls: AtomicUsize,
}

impl InMemoryScanFetcher {
    /// Creates a fetcher with no rows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rows returned for `name`.
    #[must_use]
    pub fn with_rows(mut self, name: impl Into<String>, rows: Vec<RawMatch>) -> Self {
        self.rows.insert(name.into(), rows);
        self
    }

    /// Number of `fetch_all` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScanFetcher for InMemoryScanFetcher {
    async fn fetch_all(&self, queries: &[NamedQuery]) -> ScanResults {
        self.calls.fetch_add(1, Ordering::SeqCst);
        queries
            .iter()
            .map(|query| {
                let rows = self.rows.get(&query.name).cloned().unwrap_or_default();
                ScanOutput::new(query.name.clone(), rows)
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "InMemory"
    }
}
