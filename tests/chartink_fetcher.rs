//! Chartink fetcher against a mock screener.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use options_scanner::infrastructure::scanners::{
    ChartinkConfig, ChartinkFetcher, NamedQuery, ScanFetcher,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(server: &MockServer, request_timeout_ms: u64) -> ChartinkFetcher {
    ChartinkFetcher::new(ChartinkConfig {
        base_url: server.uri(),
        request_timeout_ms,
        warmup_timeout_ms: 2_000,
    })
    .unwrap()
}

async fn mount_warmup(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/screener/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("_csrf_token={token}; Path=/").as_str())
                .set_body_string("<html></html>"),
        )
        .mount(server)
        .await;
}

fn rows(symbols: &[&str]) -> serde_json::Value {
    let data: Vec<_> = symbols
        .iter()
        .map(|s| {
            json!({
                "nsecode": s,
                "close": 1500,
                "volume": "1,000,000",
                "per_chg_vol": 2.0,
                "per_chg": 2.0
            })
        })
        .collect();
    json!({ "data": data })
}

async fn mount_clause(server: &MockServer, clause: &str, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/screener/process"))
        .and(body_string_contains(format!("scan_clause={clause}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn posts_each_clause_with_csrf_token() {
    let server = MockServer::start().await;
    mount_warmup(&server, "tok123").await;

    Mock::given(method("POST"))
        .and(path("/screener/process"))
        .and(body_string_contains("_csrf_token=tok123"))
        .and(body_string_contains("scan_clause=alpha"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows(&["TCS", "INFY"])))
        .expect(1)
        .mount(&server)
        .await;
    mount_clause(&server, "beta", rows(&["TCS"])).await;

    let results = fetcher(&server, 2_000)
        .fetch_all(&[
            NamedQuery::new("first", "alpha"),
            NamedQuery::new("second", "beta"),
        ])
        .await;

    assert_eq!(results.names().collect::<Vec<_>>(), ["first", "second"]);
    assert_eq!(results.get("first").unwrap().len(), 2);
    assert_eq!(results.get("second").unwrap().len(), 1);
    assert_eq!(results.total_rows(), 3);
}

#[tokio::test]
async fn timed_out_clause_contributes_empty_rows() {
    let server = MockServer::start().await;
    mount_warmup(&server, "tok").await;

    Mock::given(method("POST"))
        .and(path("/screener/process"))
        .and(body_string_contains("scan_clause=slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(rows(&["SBIN"]))
                .set_delay(Duration::from_millis(1_500)),
        )
        .mount(&server)
        .await;
    mount_clause(&server, "fast", rows(&["TCS"])).await;

    let results = fetcher(&server, 300)
        .fetch_all(&[
            NamedQuery::new("slow_scan", "slow"),
            NamedQuery::new("fast_scan", "fast"),
        ])
        .await;

    assert_eq!(results.len(), 2);
    assert!(results.get("slow_scan").unwrap().is_empty());
    assert_eq!(results.get("fast_scan").unwrap().len(), 1);
}

#[tokio::test]
async fn server_error_contributes_empty_rows() {
    let server = MockServer::start().await;
    mount_warmup(&server, "tok").await;

    Mock::given(method("POST"))
        .and(path("/screener/process"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let results = fetcher(&server, 2_000)
        .fetch_all(&[NamedQuery::new("only", "gamma")])
        .await;

    assert_eq!(results.len(), 1);
    assert!(results.all_empty());
}

#[tokio::test]
async fn missing_data_field_is_empty() {
    let server = MockServer::start().await;
    mount_warmup(&server, "tok").await;
    mount_clause(&server, "delta", json!({ "scan_error": "bad clause" })).await;

    let results = fetcher(&server, 2_000)
        .fetch_all(&[NamedQuery::new("only", "delta")])
        .await;

    assert!(results.get("only").unwrap().is_empty());
}

#[tokio::test]
async fn failed_warmup_still_posts_clauses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/screener/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/screener/process"))
        .and(body_string_contains("_csrf_token=&"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows(&["TCS"])))
        .expect(1)
        .mount(&server)
        .await;

    let results = fetcher(&server, 2_000)
        .fetch_all(&[NamedQuery::new("only", "epsilon")])
        .await;

    assert_eq!(results.total_rows(), 1);
}

#[tokio::test]
async fn no_queries_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let results = fetcher(&server, 2_000).fetch_all(&[]).await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn malformed_row_keeps_the_valid_rows() {
    let server = MockServer::start().await;
    mount_warmup(&server, "tok").await;

    let body = json!({ "data": [
        { "nsecode": "TCS", "close": 1500, "volume": 1_000_000, "per_chg_vol": 2.0, "per_chg": 2.0 },
        { "nsecode": 532540, "close": 3500 },
        null
    ]});
    mount_clause(&server, "mixed", body).await;

    let results = fetcher(&server, 2_000)
        .fetch_all(&[NamedQuery::new("mixed_scan", "mixed")])
        .await;

    let rows = results.get("mixed_scan").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].raw_symbol(), "TCS");
}
