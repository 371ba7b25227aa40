//! # HTTP Client
//!
//! Shared HTTP client for upstream adapters.
//!
//! Wraps a `reqwest` client with:
//! - A default per-request timeout, overridable per call
//! - Browser-like default headers
//! - A cookie jar, so session cookies set by one response are replayed
//! - Mapping of transport and status failures to [`UpstreamError`]
//!
//! # Examples
//!
//! ```ignore
//! use options_scanner::infrastructure::http::client::HttpClient;
//!
//! let client = HttpClient::new(20_000)?;
//! let body = client.get_bytes(url, HeaderMap::new(), Some(15_000)).await?;
//! ```

use crate::infrastructure::http::error::{UpstreamError, UpstreamResult};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Desktop browser user agent sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Returns headers a desktop browser would send.
#[must_use]
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/json,text/csv,*/*;q=0.8"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers
}

/// HTTP client wrapper for upstream adapters.
///
/// Cloning is cheap and clones share the connection pool and cookie jar.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client.
    client: Client,
    /// Cookies received from upstreams.
    cookies: Arc<Jar>,
    /// Default request timeout in milliseconds.
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a client with browser-like default headers.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::ClientSetup` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> UpstreamResult<Self> {
        Self::with_headers(timeout_ms, browser_headers())
    }

    /// Creates a client with custom default headers.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::ClientSetup` if the client cannot be created.
    pub fn with_headers(timeout_ms: u64, default_headers: HeaderMap) -> UpstreamResult<Self> {
        let cookies = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .default_headers(default_headers)
            .cookie_provider(Arc::clone(&cookies))
            .build()
            .map_err(|e| UpstreamError::client_setup(e.to_string()))?;

        Ok(Self {
            client,
            cookies,
            timeout_ms,
        })
    }

    /// Returns the default timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Makes a GET request with extra headers and returns the raw body.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Timeout` or `UpstreamError::Unreachable` if
    /// the request fails, or a status-derived error for non-2xx responses.
    pub async fn get_bytes(
        &self,
        url: &str,
        headers: HeaderMap,
        timeout_ms: Option<u64>,
    ) -> UpstreamResult<Vec<u8>> {
        let request = self.client.get(url).headers(headers);
        let response = self.send(url, request, timeout_ms).await?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| UpstreamError::unexpected_response(url, format!("unreadable body: {e}")))
    }

    /// Makes a form-encoded POST request and deserializes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Timeout` or `UpstreamError::Unreachable` if
    /// the request fails, a status-derived error for non-2xx responses, or
    /// `UpstreamError::UnexpectedResponse` if the body is not the expected
    /// JSON.
    pub async fn post_form<T, F>(
        &self,
        url: &str,
        form: &F,
        headers: HeaderMap,
        timeout_ms: Option<u64>,
    ) -> UpstreamResult<T>
    where
        T: DeserializeOwned,
        F: Serialize + ?Sized,
    {
        let request = self.client.post(url).headers(headers).form(form);
        let response = self.send(url, request, timeout_ms).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::unexpected_response(url, format!("invalid JSON: {e}")))
    }

    /// Loads `url` to obtain a session cookie and returns its value.
    ///
    /// The cookie is read from the response's `Set-Cookie` headers first,
    /// then from the jar (which also holds cookies from earlier calls).
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Timeout` or `UpstreamError::Unreachable` if
    /// the request fails, or a status-derived error for non-2xx responses.
    pub async fn fetch_cookie(
        &self,
        url: &str,
        name: &str,
        headers: HeaderMap,
        timeout_ms: Option<u64>,
    ) -> UpstreamResult<Option<String>> {
        let request = self.client.get(url).headers(headers);
        let response = self.send(url, request, timeout_ms).await?;
        let from_response = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|set_cookie| cookie_value(set_cookie, name));
        Ok(from_response.or_else(|| self.cookie(url, name)))
    }

    /// Returns the value of a cookie the jar holds for `url`.
    #[must_use]
    pub fn cookie(&self, url: &str, name: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        let header = self.cookies.cookies(&url)?;
        header.to_str().ok()?.split(';').find_map(|pair| cookie_value(pair, name))
    }

    async fn send(
        &self,
        url: &str,
        request: RequestBuilder,
        timeout_ms: Option<u64>,
    ) -> UpstreamResult<Response> {
        let timeout_ms = timeout_ms.unwrap_or(self.timeout_ms);
        let response = request
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| map_reqwest_error(url, &e, timeout_ms))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let retry_after_ms = retry_after_ms(response.headers());
            let body = response.text().await.unwrap_or_default();
            Err(map_status_error(url, status, &body, retry_after_ms))
        }
    }
}

/// Extracts `name`'s value from a `name=value[; attrs]` pair.
fn cookie_value(pair: &str, name: &str) -> Option<String> {
    let first = pair.split(';').next()?;
    let (key, value) = first.trim().split_once('=')?;
    (key.trim() == name).then(|| value.trim().to_string())
}

fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}

fn map_reqwest_error(url: &str, error: &reqwest::Error, timeout_ms: u64) -> UpstreamError {
    if error.is_timeout() {
        UpstreamError::timeout(url, timeout_ms)
    } else if error.is_builder() {
        UpstreamError::client_setup(format!("request for {url} is malformed: {error}"))
    } else {
        UpstreamError::unreachable(url, error.to_string())
    }
}

/// 419 is the status Laravel-style apps send for an expired CSRF token.
const CSRF_EXPIRED: u16 = 419;

fn map_status_error(
    url: &str,
    status: StatusCode,
    body: &str,
    retry_after_ms: Option<u64>,
) -> UpstreamError {
    match status.as_u16() {
        401 | 403 | CSRF_EXPIRED => UpstreamError::refused(url, status.as_u16()),
        429 => UpstreamError::rate_limited(url, retry_after_ms),
        500..=599 => UpstreamError::server_error(url, status.as_u16(), truncate(body, 200)),
        _ => UpstreamError::unexpected_response(
            url,
            format!("status {status}: {}", truncate(body, 200)),
        ),
    }
}

fn truncate(body: &str, max_chars: usize) -> &str {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => body.get(..idx).unwrap_or(body),
        None => body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn new_client() {
        let client = HttpClient::new(5000);
        assert!(client.is_ok());
        assert_eq!(client.unwrap().timeout_ms(), 5000);
    }

    #[test]
    fn browser_headers_carry_user_agent() {
        let headers = browser_headers();
        assert_eq!(
            headers.get(header::USER_AGENT).unwrap().to_str().unwrap(),
            BROWSER_USER_AGENT
        );
    }

    #[test]
    fn status_mapping() {
        let url = "https://chartink.com/screener/process";
        assert_eq!(
            map_status_error(url, StatusCode::FORBIDDEN, "", None),
            UpstreamError::refused(url, 403)
        );
        assert_eq!(
            map_status_error(url, StatusCode::from_u16(419).unwrap(), "", None),
            UpstreamError::refused(url, 419)
        );
        assert_eq!(
            map_status_error(url, StatusCode::TOO_MANY_REQUESTS, "", Some(5000)),
            UpstreamError::rate_limited(url, Some(5000))
        );
        assert!(map_status_error(url, StatusCode::BAD_GATEWAY, "", None).is_retryable());
        assert!(!map_status_error(url, StatusCode::NOT_FOUND, "", None).is_retryable());
    }

    #[test]
    fn retry_after_header_in_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(header::RETRY_AFTER, HeaderValue::from_static("30"));
        assert_eq!(retry_after_ms(&headers), Some(30_000));
        assert_eq!(retry_after_ms(&HeaderMap::new()), None);
    }

    #[test]
    fn truncate_long_bodies() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
    }

    #[test]
    fn cookie_value_parsing() {
        assert_eq!(
            cookie_value("_csrf_token=abc; Path=/; HttpOnly", "_csrf_token"),
            Some("abc".to_string())
        );
        assert_eq!(cookie_value(" ci_session=xyz", "ci_session"), Some("xyz".to_string()));
        assert_eq!(cookie_value("other=1", "_csrf_token"), None);
        assert_eq!(cookie_value("garbage", "_csrf_token"), None);
    }

    #[test]
    fn cookie_lookup_reads_jar() {
        let client = HttpClient::new(1000).unwrap();
        let url = Url::parse("https://chartink.com/screener/").unwrap();
        client
            .cookies
            .add_cookie_str("_csrf_token=abc123; Path=/", &url);
        client.cookies.add_cookie_str("other=x; Path=/", &url);

        assert_eq!(
            client.cookie("https://chartink.com/screener/", "_csrf_token"),
            Some("abc123".to_string())
        );
        assert_eq!(client.cookie("https://chartink.com/", "missing"), None);
        assert_eq!(client.cookie("not a url", "_csrf_token"), None);
    }
}
