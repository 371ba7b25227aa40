//! # REST Handlers
//!
//! Request handlers, response bodies and error mapping.
//!
//! Response bodies are plain serde structs so that the one-shot CLI mode
//! prints exactly what `GET /analyze` would return.

use crate::application::error::AnalysisError;
use crate::application::services::analysis::{AnalysisEngine, AnalysisOutcome, AnalysisReport};
use crate::application::services::ranking_strategy::RankedCandidate;
use crate::domain::services::hint::hint_for;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Offset of India Standard Time from UTC, in seconds.
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Seconds a client should wait before retrying after a 503.
pub const RETRY_AFTER_SECS: u64 = 60;

/// Message returned by `GET /`.
pub const ALIVE_MESSAGE: &str = "Options scanner is alive";

/// Message returned when no candidate is eligible.
pub const NO_RESULTS_MESSAGE: &str =
    "Scanners returned results but none are F&O eligible. Try again later.";

/// Shared state of the HTTP server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Pipeline run for every `GET /analyze`.
    pub engine: Arc<AnalysisEngine>,
}

impl AppState {
    /// Creates the state.
    #[must_use]
    pub fn new(engine: Arc<AnalysisEngine>) -> Self {
        Self { engine }
    }
}

/// India Standard Time.
#[must_use]
pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// `2024-03-01 15:30:00 IST`
#[must_use]
pub fn format_ist(at: DateTime<Utc>) -> String {
    at.with_timezone(&ist())
        .format("%Y-%m-%d %H:%M:%S IST")
        .to_string()
}

/// `2024-03-01T15:30:00+05:30`
#[must_use]
pub fn format_iso_ist(at: DateTime<Utc>) -> String {
    at.with_timezone(&ist())
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Liveness message.
    pub message: String,
}

/// One ranked pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickResponse {
    /// 1-based rank.
    pub rank: usize,
    /// Ticker.
    pub symbol: String,
    /// Last price.
    pub price: f64,
    /// Signed percent change, e.g. `"+2.00%"`.
    pub change_pct: String,
    /// Relative volume, e.g. `"2.0x avg volume"`.
    pub volume_ratio: String,
    /// Composite score.
    pub score: f64,
    /// Scans that reported the symbol, in run order.
    pub scanners_hit: Vec<String>,
    /// Directional hint label.
    pub strategy_hint: String,
}

impl From<&RankedCandidate> for PickResponse {
    fn from(candidate: &RankedCandidate) -> Self {
        let record = &candidate.record;
        let hint = record.hint().unwrap_or_else(|| hint_for(record));
        Self {
            rank: candidate.rank,
            symbol: record.symbol().to_string(),
            price: record.close(),
            change_pct: format!("{:+.2}%", record.change_pct()),
            volume_ratio: format!("{:.1}x avg volume", record.volume_ratio()),
            score: record.score().unwrap_or_else(|| candidate.score()),
            scanners_hit: record.scanners_hit().to_vec(),
            strategy_hint: hint.label().to_string(),
        }
    }
}

/// Body of a successful `GET /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Run start in IST, `%Y-%m-%d %H:%M:%S IST`.
    pub generated_at: String,
    /// Run duration, one decimal.
    pub elapsed_seconds: f64,
    /// Distinct symbols across all scans.
    pub total_candidates_scanned: usize,
    /// Symbols that passed the eligibility filter.
    pub fo_eligible_count: usize,
    /// Best picks, rank 1 first.
    pub top_picks: Vec<PickResponse>,
}

impl From<&AnalysisReport> for AnalyzeResponse {
    fn from(report: &AnalysisReport) -> Self {
        Self {
            status: "ok".to_string(),
            generated_at: format_ist(report.started_at),
            elapsed_seconds: report.elapsed_seconds(),
            total_candidates_scanned: report.total_candidates,
            fo_eligible_count: report.eligible_count,
            top_picks: report.picks.iter().map(PickResponse::from).collect(),
        }
    }
}

/// Body when no candidate is eligible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoResultsResponse {
    /// Always `"no_results"`.
    pub status: String,
    /// Explanation.
    pub message: String,
    /// Run start, ISO-8601 in IST.
    pub generated_at: String,
}

/// Any 200 body of `GET /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalyzeBody {
    /// Picks were ranked.
    Ok(AnalyzeResponse),
    /// Nothing eligible.
    NoResults(NoResultsResponse),
}

impl From<&AnalysisOutcome> for AnalyzeBody {
    fn from(outcome: &AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Ranked(report) => Self::Ok(AnalyzeResponse::from(report)),
            AnalysisOutcome::NoEligibleCandidates { started_at, .. } => {
                Self::NoResults(NoResultsResponse {
                    status: "no_results".to_string(),
                    message: NO_RESULTS_MESSAGE.to_string(),
                    generated_at: format_iso_ist(*started_at),
                })
            }
        }
    }
}

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `"error"`.
    pub status: String,
    /// What went wrong.
    pub message: String,
}

/// HTTP-facing error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The run could not complete.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Analysis(
                AnalysisError::EligibilityUnavailable | AnalysisError::NoScanResults { .. },
            ) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns true if the client may retry later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Analysis(e) => e.is_retryable(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.to_string(),
        };
        let mut response = (status, Json(body)).into_response();
        if self.is_retryable() {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
        }
        response
    }
}

/// `GET /`
#[allow(clippy::unused_async)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: ALIVE_MESSAGE.to_string(),
    })
}

/// `GET /analyze`
///
/// # Errors
///
/// Returns `ApiError` (503) when an upstream is unavailable.
pub async fn analyze(State(state): State<Arc<AppState>>) -> Result<Json<AnalyzeBody>, ApiError> {
    match state.engine.run().await {
        Ok(outcome) => Ok(Json(AnalyzeBody::from(&outcome))),
        Err(e) => {
            warn!(error = %e, "Analysis unavailable");
            Err(e.into())
        }
    }
}
