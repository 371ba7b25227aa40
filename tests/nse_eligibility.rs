//! NSE F&O list download and cache behaviour against a mock archive.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use options_scanner::infrastructure::eligibility::{
    EligibilityProvider, NseFoConfig, NseFoListProvider,
};
use std::path::PathBuf;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FO_CSV: &str = "UNDERLYING                                        ,SYMBOL    ,JAN-24,FEB-24\n\
Derivatives on Individual Securities,,,\n\
TATA CONSULTANCY SERV LT                          ,TCS       ,175   ,175\n\
STATE BANK OF INDIA                               ,SBIN      ,1500  ,1500\n";

fn provider(server: &MockServer, cache_file: PathBuf) -> NseFoListProvider {
    NseFoListProvider::new(NseFoConfig {
        url: format!("{}/content/fo/fo_mktlots.csv", server.uri()),
        cache_file,
        cache_ttl_hours: 24,
        timeout_ms: 2_000,
    })
    .unwrap()
}

#[tokio::test]
async fn downloads_and_writes_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/content/fo/fo_mktlots.csv"))
        .and(header_exists("referer"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FO_CSV))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("fo_stocks_cache.csv");
    let symbols = provider(&server, cache.clone()).eligible_symbols().await;

    assert_eq!(symbols.len(), 2);
    assert!(symbols.contains("TCS"));
    assert!(symbols.contains("SBIN"));
    assert_eq!(tokio::fs::read_to_string(&cache).await.unwrap(), FO_CSV);
}

#[tokio::test]
async fn second_load_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/content/fo/fo_mktlots.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FO_CSV))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let provider = provider(&server, dir.path().join("fo.csv"));

    let first = provider.eligible_symbols().await;
    let second = provider.eligible_symbols().await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn concurrent_loads_download_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/content/fo/fo_mktlots.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FO_CSV))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let provider = provider(&server, dir.path().join("fo.csv"));

    let (a, b) = tokio::join!(provider.eligible_symbols(), provider.eligible_symbols());
    assert_eq!(a.len(), 2);
    assert_eq!(a, b);
}

#[tokio::test]
async fn forbidden_yields_empty_set_and_no_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Access Denied"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("fo.csv");
    let provider = provider(&server, cache.clone());

    assert!(provider.eligible_symbols().await.is_empty());
    assert!(!cache.exists());
}

#[tokio::test]
async fn stale_cache_is_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FO_CSV))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("fo.csv");
    tokio::fs::write(&cache, "SYMBOL\nOLDONLY\n").await.unwrap();

    let provider = NseFoListProvider::new(NseFoConfig {
        url: format!("{}/fo.csv", server.uri()),
        cache_file: cache,
        cache_ttl_hours: 0,
        timeout_ms: 2_000,
    })
    .unwrap();

    let symbols = provider.eligible_symbols().await;
    assert!(symbols.contains("TCS"));
    assert!(!symbols.contains("OLDONLY"));
}

#[tokio::test]
async fn unwritable_cache_still_returns_symbols() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FO_CSV))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("missing_dir").join("fo.csv");
    let symbols = provider(&server, cache).eligible_symbols().await;
    assert_eq!(symbols.len(), 2);
}

#[tokio::test]
async fn html_error_page_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/content/fo/fo_mktlots.csv"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>Access Denied</body></html>"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("fo.csv");
    let provider = provider(&server, cache.clone());

    assert!(provider.eligible_symbols().await.is_empty());
    assert!(!cache.exists());
    // nothing was cached, so the next load asks upstream again
    assert!(provider.eligible_symbols().await.is_empty());
}

#[tokio::test]
async fn header_only_list_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/content/fo/fo_mktlots.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("UNDERLYING,SYMBOL,JAN-24\n"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("fo.csv");
    assert!(provider(&server, cache.clone()).eligible_symbols().await.is_empty());
    assert!(!cache.exists());
}
