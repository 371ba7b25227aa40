//! # Chartink Fetcher
//!
//! [`ScanFetcher`] backed by the Chartink screener.
//!
//! The screener only answers POSTs that carry a CSRF token, so a run
//! starts with a warm-up GET of the screener page to obtain the
//! `_csrf_token` cookie. Every clause is then posted concurrently to the
//! process endpoint as a form with `_csrf_token` and `scan_clause`.
//!
//! Failures never escape: a timed-out clause is logged at `warn`, any
//! other failure at `error`, and both contribute an empty row list.

use crate::domain::entities::raw_match::RawMatch;
use crate::domain::entities::scan_results::{ScanOutput, ScanResults};
use crate::infrastructure::http::client::HttpClient;
use crate::infrastructure::http::error::{UpstreamError, UpstreamResult};
use crate::infrastructure::scanners::traits::{NamedQuery, ScanFetcher};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Default screener origin.
pub const DEFAULT_BASE_URL: &str = "https://chartink.com";

/// Name of the CSRF cookie set by the screener page.
pub const CSRF_COOKIE: &str = "_csrf_token";

/// Default timeout for a clause POST.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 20_000;

/// Default timeout for the warm-up GET.
pub const DEFAULT_WARMUP_TIMEOUT_MS: u64 = 10_000;

/// Connection settings for [`ChartinkFetcher`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartinkConfig {
    /// Screener origin, without trailing slash.
    pub base_url: String,
    /// Timeout for each clause POST in milliseconds.
    pub request_timeout_ms: u64,
    /// Timeout for the warm-up GET in milliseconds.
    pub warmup_timeout_ms: u64,
}

impl Default for ChartinkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            warmup_timeout_ms: DEFAULT_WARMUP_TIMEOUT_MS,
        }
    }
}

impl ChartinkConfig {
    /// Creates a config pointing at `base_url` with default timeouts.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// URL of the screener page (warm-up and referer).
    #[must_use]
    pub fn screener_url(&self) -> String {
        format!("{}/screener/", self.base_url.trim_end_matches('/'))
    }

    /// URL of the clause processing endpoint.
    #[must_use]
    pub fn process_url(&self) -> String {
        format!("{}/screener/process", self.base_url.trim_end_matches('/'))
    }
}

/// Form body posted for one clause.
#[derive(Debug, Serialize)]
struct ProcessForm<'a> {
    #[serde(rename = "_csrf_token")]
    csrf_token: &'a str,
    scan_clause: &'a str,
}

/// Response of the process endpoint. Other keys are ignored.
///
/// Rows are kept as loose JSON so that one malformed row does not fail
/// the whole result set.
#[derive(Debug, Deserialize)]
struct ProcessResponse {
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

impl ProcessResponse {
    /// Decodes every row that fits [`RawMatch`] and counts the rest.
    fn into_rows(self) -> (Vec<RawMatch>, usize) {
        let mut rows = Vec::new();
        let mut skipped = 0;
        for value in self.data.unwrap_or_default() {
            match serde_json::from_value::<RawMatch>(value) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    debug!(error = %e, "Skipping undecodable scanner row");
                    skipped += 1;
                }
            }
        }
        (rows, skipped)
    }
}

/// Chartink screener adapter.
#[derive(Debug, Clone)]
pub struct ChartinkFetcher {
    client: HttpClient,
    config: ChartinkConfig,
}

impl ChartinkFetcher {
    /// Creates a fetcher with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::ClientSetup` if the HTTP client cannot be
    /// created.
    pub fn new(config: ChartinkConfig) -> UpstreamResult<Self> {
        let client = HttpClient::new(config.request_timeout_ms)?;
        Ok(Self { client, config })
    }

    /// Creates a fetcher over an existing client.
    #[must_use]
    pub fn with_client(client: HttpClient, config: ChartinkConfig) -> Self {
        Self { client, config }
    }

    /// Returns the connection settings.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ChartinkConfig {
        &self.config
    }

    fn ajax_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(referer) = HeaderValue::from_str(&self.config.screener_url()) {
            headers.insert(header::REFERER, referer);
        }
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        headers
    }

    /// Loads the screener page and returns the CSRF token.
    ///
    /// A missing cookie or a failed warm-up yields an empty token; the
    /// clause POSTs are still attempted.
    async fn csrf_token(&self) -> String {
        let url = self.config.screener_url();
        let mut headers = HeaderMap::new();
        if let Ok(referer) = HeaderValue::from_str(&url) {
            headers.insert(header::REFERER, referer);
        }

        match self
            .client
            .fetch_cookie(&url, CSRF_COOKIE, headers, Some(self.config.warmup_timeout_ms))
            .await
        {
            Ok(Some(token)) => {
                debug!("CSRF token acquired");
                token
            }
            Ok(None) => {
                warn!(cookie = CSRF_COOKIE, "CSRF token not found, scan requests may fail");
                String::new()
            }
            Err(e) => {
                warn!(error = %e, "Screener warm-up failed, continuing without CSRF token");
                String::new()
            }
        }
    }

    async fn run_query(
        &self,
        csrf_token: &str,
        query: &NamedQuery,
    ) -> UpstreamResult<Vec<RawMatch>> {
        let form = ProcessForm {
            csrf_token,
            scan_clause: &query.clause,
        };
        let response: ProcessResponse = self
            .client
            .post_form(
                &self.config.process_url(),
                &form,
                self.ajax_headers(),
                Some(self.config.request_timeout_ms),
            )
            .await?;
        let (rows, skipped) = response.into_rows();
        if skipped > 0 {
            warn!(scanner = %query.name, skipped, "Dropped malformed scanner rows");
        }
        Ok(rows)
    }

    /// Runs one query, degrading every failure to an empty list.
    async fn run_query_or_empty(&self, csrf_token: &str, query: &NamedQuery) -> ScanOutput {
        match self.run_query(csrf_token, query).await {
            Ok(rows) => {
                info!(scanner = %query.name, rows = rows.len(), "Scanner returned results");
                ScanOutput::new(query.name.clone(), rows)
            }
            Err(e @ UpstreamError::Timeout { .. }) => {
                warn!(scanner = %query.name, error = %e, "Scanner timed out");
                ScanOutput::empty(query.name.clone())
            }
            Err(e) => {
                error!(scanner = %query.name, error = %e, "Scanner failed");
                ScanOutput::empty(query.name.clone())
            }
        }
    }
}

#[async_trait]
impl ScanFetcher for ChartinkFetcher {
    async fn fetch_all(&self, queries: &[NamedQuery]) -> ScanResults {
        if queries.is_empty() {
            return ScanResults::new();
        }

        let csrf_token = self.csrf_token().await;
        let outputs = join_all(
            queries
                .iter()
                .map(|query| self.run_query_or_empty(&csrf_token, query)),
        )
        .await;

        // join_all keeps input order, so outputs line up with `queries`.
        let results: ScanResults = outputs.into_iter().collect();
        info!(
            scanners = results.len(),
            total_rows = results.total_rows(),
            "Scan fetch complete"
        );
        results
    }

    fn name(&self) -> &'static str {
        "Chartink"
    }
}
