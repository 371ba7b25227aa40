//! # Scanners
//!
//! Technical-scan sources.
//!
//! - [`traits`] - The [`ScanFetcher`] port and [`NamedQuery`]
//! - [`chartink`] - Chartink screener adapter
//! - [`in_memory`] - Canned fetcher for tests

pub mod chartink;
pub mod in_memory;
pub mod traits;

pub use chartink::{ChartinkConfig, ChartinkFetcher};
pub use in_memory::InMemoryScanFetcher;
pub use traits::{NamedQuery, ScanFetcher};
