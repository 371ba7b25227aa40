//! # Options Scanner
//!
//! On-demand swing-trade scanner for Indian equities.
//!
//! One run executes a set of technical scans against the Chartink
//! screener, merges their rows per symbol, keeps only symbols listed in
//! the NSE F&O segment, scores each survivor and returns the best few with
//! a directional options hint.
//!
//! # Architecture
//!
//! - [`domain`]: symbols, records, scoring and hint rules (no I/O)
//! - [`application`]: aggregation, ranking and the [`AnalysisEngine`] pipeline
//! - [`infrastructure`]: Chartink and NSE adapters over a shared HTTP client
//! - [`api`]: axum routes `GET /` and `GET /analyze`
//! - [`config`], [`logging`], [`bootstrap`]: process setup
//!
//! # Example
//!
//! ```no_run
//! use options_scanner::bootstrap::build_engine;
//! use options_scanner::config::ScannerConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScannerConfig::load(None)?;
//! let engine = build_engine(&config)?;
//! let outcome = engine.run().await?;
//! if let Some(best) = outcome.report().and_then(|r| r.best_pick()) {
//!     println!("{best}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`AnalysisEngine`]: application::services::analysis::AnalysisEngine

pub mod api;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
