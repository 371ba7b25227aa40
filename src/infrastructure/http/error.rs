//! # Upstream Errors
//!
//! Failures of calls to third-party endpoints (the screener and the
//! exchange archive). Every variant names the URL that failed so that a
//! single log line is enough to tell which upstream misbehaved.
//!
//! # Error Hierarchy
//!
//! ```text
//! UpstreamError
//! ├── Timeout             - No answer within the deadline (retryable)
//! ├── Unreachable         - DNS, refused or reset connection (retryable)
//! ├── RateLimited         - 429, optionally with Retry-After (retryable)
//! ├── ServerError         - 5xx (retryable)
//! ├── Refused             - 401/403/419: session or bot wall rejected us
//! ├── UnexpectedResponse  - Other status, or a body we cannot decode
//! └── ClientSetup         - The HTTP client itself could not be built
//! ```
//!
//! # Examples
//!
//! ```
//! use options_scanner::infrastructure::http::error::UpstreamError;
//!
//! let error = UpstreamError::timeout("https://chartink.com/screener/process", 20_000);
//! assert!(error.is_retryable());
//! assert_eq!(error.url(), Some("https://chartink.com/screener/process"));
//!
//! let error = UpstreamError::refused("https://chartink.com/screener/process", 419);
//! assert!(!error.is_retryable());
//! ```

use thiserror::Error;

/// Error type for upstream HTTP calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// No response within the deadline.
    #[error("{url} did not answer within {timeout_ms}ms")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Deadline that elapsed.
        timeout_ms: u64,
    },

    /// The connection could not be made or broke mid-request.
    #[error("could not reach {url}: {reason}")]
    Unreachable {
        /// Requested URL.
        url: String,
        /// Transport error text.
        reason: String,
    },

    /// The upstream is throttling us.
    #[error("{url} is rate limiting requests")]
    RateLimited {
        /// Requested URL.
        url: String,
        /// Delay asked for by `Retry-After`, in milliseconds.
        retry_after_ms: Option<u64>,
    },

    /// The upstream failed on its side.
    #[error("{url} failed with status {status}: {body}")]
    ServerError {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// The upstream rejected the session or the client.
    #[error("{url} refused the request with status {status}")]
    Refused {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// Any other status, or a body that does not decode.
    #[error("unexpected response from {url}: {reason}")]
    UnexpectedResponse {
        /// Requested URL.
        url: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

impl UpstreamError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(url: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            url: url.into(),
            timeout_ms,
        }
    }

    /// Creates an unreachable error.
    #[must_use]
    pub fn unreachable(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unreachable {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a rate limited error.
    #[must_use]
    pub fn rate_limited(url: impl Into<String>, retry_after_ms: Option<u64>) -> Self {
        Self::RateLimited {
            url: url.into(),
            retry_after_ms,
        }
    }

    /// Creates a server error.
    #[must_use]
    pub fn server_error(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::ServerError {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Creates a refused error.
    #[must_use]
    pub fn refused(url: impl Into<String>, status: u16) -> Self {
        Self::Refused {
            url: url.into(),
            status,
        }
    }

    /// Creates an unexpected response error.
    #[must_use]
    pub fn unexpected_response(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a client setup error.
    #[must_use]
    pub fn client_setup(reason: impl Into<String>) -> Self {
        Self::ClientSetup(reason.into())
    }

    /// Returns true for a deadline overrun.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true if a later attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::Unreachable { .. }
                | Self::RateLimited { .. }
                | Self::ServerError { .. }
        )
    }

    /// Delay the upstream asked for, if any.
    #[must_use]
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_ms, .. } => *retry_after_ms,
            _ => None,
        }
    }

    /// URL of the failed call. `None` for client setup failures.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Timeout { url, .. }
            | Self::Unreachable { url, .. }
            | Self::RateLimited { url, .. }
            | Self::ServerError { url, .. }
            | Self::Refused { url, .. }
            | Self::UnexpectedResponse { url, .. } => Some(url),
            Self::ClientSetup(_) => None,
        }
    }
}

/// Result type for upstream calls.
pub type UpstreamResult<T> = Result<T, UpstreamError>;
