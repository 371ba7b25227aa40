//! # Application Errors
//!
//! Error types for the application layer.
//!
//! A run fails only when an upstream is unusable as a whole. Everything
//! narrower (a failed scan, a bad numeric cell, no eligible candidate) is
//! absorbed earlier and reported through the run's outcome instead.
//!
//! # Error Hierarchy
//!
//! ```text
//! AnalysisError
//! ├── EligibilityUnavailable  - Eligibility list empty or unloadable
//! └── NoScanResults           - Every configured scan returned nothing
//! ```
//!
//! # Examples
//!
//! ```
//! use options_scanner::application::error::AnalysisError;
//!
//! let err = AnalysisError::no_scan_results(3);
//! assert!(err.is_retryable());
//! assert!(err.to_string().contains("3 scans"));
//! ```

use thiserror::Error;

/// Error type for an analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The eligibility set came back empty.
    #[error("could not load the F&O eligibility list; try again later")]
    EligibilityUnavailable,

    /// No scan returned a row.
    #[error("all {queries} scans returned no results; the screener may be down, try again later")]
    NoScanResults {
        /// Number of scans that were run.
        queries: usize,
    },
}

impl AnalysisError {
    /// Creates an eligibility unavailable error.
    #[must_use]
    pub fn eligibility_unavailable() -> Self {
        Self::EligibilityUnavailable
    }

    /// Creates a no scan results error.
    #[must_use]
    pub fn no_scan_results(queries: usize) -> Self {
        Self::NoScanResults { queries }
    }

    /// Returns true if this error is retryable.
    ///
    /// Both variants describe upstream outages, so a later run may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::EligibilityUnavailable | Self::NoScanResults { .. }
        )
    }
}

/// Result type for analysis runs.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
