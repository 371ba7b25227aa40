//! # NSE F&O Eligibility
//!
//! [`EligibilityProvider`] backed by the NSE F&O market-lot list.
//!
//! NSE publishes every stock with live futures and options contracts in a
//! CSV (`fo_mktlots.csv`). The provider downloads it, keeps the raw body
//! in a cache file and reuses that file until it is older than the TTL.
//!
//! # CSV Layout
//!
//! Header names are matched after trimming and upper-casing, so
//! `" Symbol "` finds the `SYMBOL` column. Rows may have more or fewer
//! fields than the header. Blank symbols are dropped.

use crate::domain::value_objects::symbol::Symbol;
use crate::infrastructure::eligibility::error::{EligibilityError, EligibilityResult};
use crate::infrastructure::eligibility::traits::EligibilityProvider;
use crate::infrastructure::http::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Default list location.
pub const DEFAULT_FO_LIST_URL: &str = "https://nsearchives.nseindia.com/content/fo/fo_mktlots.csv";

/// Default cache file.
pub const DEFAULT_CACHE_FILE: &str = "/tmp/fo_stocks_cache.csv";

/// Default cache lifetime.
pub const DEFAULT_CACHE_TTL_HOURS: u64 = 24;

/// Default download timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Header of the symbol column.
pub const SYMBOL_COLUMN: &str = "SYMBOL";

/// NSE rejects archive requests without a site referer.
const NSE_REFERER: &str = "https://www.nseindia.com/";

/// Settings for [`NseFoListProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NseFoConfig {
    /// CSV location.
    pub url: String,
    /// Where the raw CSV is cached.
    pub cache_file: PathBuf,
    /// Cache lifetime in hours. Zero disables the cache.
    pub cache_ttl_hours: u64,
    /// Download timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for NseFoConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FO_LIST_URL.to_string(),
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl NseFoConfig {
    /// Cache lifetime.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours.saturating_mul(3600))
    }
}

/// Parses the symbol column of an F&O list.
///
/// # Errors
///
/// Returns `EligibilityError::MissingColumn` if no header matches
/// [`SYMBOL_COLUMN`], or `EligibilityError::Csv` on malformed input.
///
/// # Examples
///
/// ```
/// use options_scanner::infrastructure::eligibility::nse::parse_symbols;
///
/// let csv = b"UNDERLYING, SYMBOL ,JAN-24\nReliance,reliance ,250\nTata,TCS,175\n";
/// let symbols = parse_symbols(csv).unwrap();
/// assert_eq!(symbols.len(), 2);
/// assert!(symbols.contains("RELIANCE"));
/// ```
pub fn parse_symbols(body: &[u8]) -> EligibilityResult<HashSet<Symbol>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body);

    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(SYMBOL_COLUMN))
        .ok_or(EligibilityError::MissingColumn {
            column: SYMBOL_COLUMN,
        })?;

    let mut symbols = HashSet::new();
    for row in reader.records() {
        let row = row?;
        if let Some(symbol) = row.get(column).and_then(Symbol::parse) {
            symbols.insert(symbol);
        }
    }
    Ok(symbols)
}

/// Returns true if `path` exists and was modified less than `ttl` ago.
///
/// A modification time in the future counts as fresh.
pub async fn cache_is_fresh(path: &Path, ttl: Duration) -> bool {
    let Ok(metadata) = tokio::fs::metadata(path).await else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    match SystemTime::now().duration_since(modified) {
        Ok(age) => age < ttl,
        Err(_) => true,
    }
}

/// NSE F&O list provider with a file cache.
#[derive(Debug)]
pub struct NseFoListProvider {
    client: HttpClient,
    config: NseFoConfig,
    /// Serializes refreshes so concurrent requests download once.
    refresh: Mutex<()>,
}

impl NseFoListProvider {
    /// Creates a provider with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `EligibilityError::Download` if the HTTP client cannot be
    /// created.
    pub fn new(config: NseFoConfig) -> EligibilityResult<Self> {
        let client = HttpClient::new(config.timeout_ms)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a provider over an existing client.
    #[must_use]
    pub fn with_client(client: HttpClient, config: NseFoConfig) -> Self {
        Self {
            client,
            config,
            refresh: Mutex::new(()),
        }
    }

    /// Returns the settings.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &NseFoConfig {
        &self.config
    }

    /// Loads the list from cache or upstream.
    ///
    /// A downloaded body is cached only after it parses to at least one
    /// symbol, so an error page never replaces a good list on disk.
    ///
    /// # Errors
    ///
    /// Returns the first failure of download, cache I/O or parsing.
    pub async fn load(&self) -> EligibilityResult<HashSet<Symbol>> {
        let _guard = self.refresh.lock().await;
        let path = self.config.cache_file.as_path();

        let symbols = if cache_is_fresh(path, self.config.cache_ttl()).await {
            info!(path = %path.display(), "Using cached F&O list");
            let body = tokio::fs::read(path)
                .await
                .map_err(|e| EligibilityError::cache(path.display().to_string(), e))?;
            parse_symbols(&body)?
        } else {
            let body = self.download().await?;
            let symbols = parse_symbols(&body)?;
            if symbols.is_empty() {
                warn!(url = %self.config.url, "Downloaded F&O list has no symbols, not caching");
            } else {
                self.write_cache(&body).await;
            }
            symbols
        };

        info!(symbols = symbols.len(), "F&O list loaded");
        Ok(symbols)
    }

    async fn download(&self) -> EligibilityResult<Vec<u8>> {
        info!(url = %self.config.url, "Downloading fresh F&O list");
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static(NSE_REFERER));

        Ok(self
            .client
            .get_bytes(&self.config.url, headers, Some(self.config.timeout_ms))
            .await?)
    }

    async fn write_cache(&self, body: &[u8]) {
        let path = self.config.cache_file.as_path();
        match tokio::fs::write(path, body).await {
            Ok(()) => debug!(path = %path.display(), bytes = body.len(), "F&O list cached"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to cache F&O list"),
        }
    }
}

#[async_trait]
impl EligibilityProvider for NseFoListProvider {
    async fn eligible_symbols(&self) -> HashSet<Symbol> {
        match self.load().await {
            Ok(symbols) => symbols,
            Err(e) => {
                error!(error = %e, retryable = e.is_retryable(), "Failed to load F&O list");
                HashSet::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "NseFoList"
    }
}
