//! # Domain Entities
//!
//! - [`RawMatch`]: One scanner row as received
//! - [`ScanResults`]: Every scan of a run with its rows, in configured order
//! - [`AggregatedRecord`]: One candidate per symbol, merged across scans

pub mod aggregated_record;
pub mod raw_match;
pub mod scan_results;

pub use aggregated_record::{AggregatedRecord, MarketSnapshot};
pub use raw_match::{RawMatch, RawNumber};
pub use scan_results::{ScanOutput, ScanResults};
