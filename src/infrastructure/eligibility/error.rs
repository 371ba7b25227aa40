//! # Eligibility Errors
//!
//! Failures while loading the eligibility list. These stay inside the
//! provider: callers only ever see an empty set.

use crate::infrastructure::http::error::UpstreamError;
use thiserror::Error;

/// Error type for eligibility list loading.
#[derive(Debug, Error)]
pub enum EligibilityError {
    /// The list could not be downloaded.
    #[error("eligibility download failed: {0}")]
    Download(#[from] UpstreamError),

    /// The cache file could not be read or written.
    #[error("eligibility cache error at {path}: {source}")]
    Cache {
        /// Cache file path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The list is not valid CSV.
    #[error("eligibility list is not valid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The list has no symbol column.
    #[error("eligibility list has no {column} column")]
    MissingColumn {
        /// Expected column header.
        column: &'static str,
    },
}

impl EligibilityError {
    /// Creates a cache error.
    #[must_use]
    pub fn cache(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Cache {
            path: path.into(),
            source,
        }
    }

    /// Returns true if a later attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Download(e) => e.is_retryable(),
            Self::Cache { .. } => true,
            Self::Csv(_) | Self::MissingColumn { .. } => false,
        }
    }
}

/// Result type for eligibility loading.
pub type EligibilityResult<T> = Result<T, EligibilityError>;
