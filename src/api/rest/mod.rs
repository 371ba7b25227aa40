//! # REST API
//!
//! HTTP surface of the scanner, built on axum.
//!
//! # Endpoints
//!
//! - `GET /` - Liveness check
//! - `GET /analyze` - Run the full pipeline and return the top picks
//!
//! `/analyze` answers 200 with either an `"ok"` body carrying the picks or a
//! `"no_results"` body when nothing is F&O eligible. Upstream outages map to
//! 503 with a `Retry-After` header.
//!
//! # Usage
//!
//! ```ignore
//! use options_scanner::api::rest::{AppState, create_router};
//! use std::sync::Arc;
//!
//! let router = create_router(Arc::new(AppState::new(engine)));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    AnalyzeBody, AnalyzeResponse, ApiError, AppState, ErrorResponse, HealthResponse,
    NoResultsResponse, PickResponse,
};
pub use routes::create_router;
