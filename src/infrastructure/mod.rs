//! # Infrastructure Layer
//!
//! Adapters for the outside world.
//!
//! - [`http`]: shared HTTP client and upstream error taxonomy
//! - [`scanners`]: Chartink screener client
//! - [`eligibility`]: NSE F&O list download and file cache

pub mod eligibility;
pub mod http;
pub mod scanners;
