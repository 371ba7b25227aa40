//! # REST Routes
//!
//! Router assembly.

use super::handlers::{AppState, analyze, health};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Builds the router.
///
/// | Method | Path       | Handler     |
/// |--------|------------|-------------|
/// | GET    | `/`        | [`health`]  |
/// | GET    | `/analyze` | [`analyze`] |
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/analyze", get(analyze))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::services::analysis::{AnalysisConfig, AnalysisEngine};
    use crate::application::services::ranking_strategy::CompositeScoreStrategy;
    use crate::domain::services::scoring::{CompositeScorer, ScoringConfig};
    use crate::infrastructure::eligibility::InMemoryEligibilityProvider;
    use crate::infrastructure::scanners::{InMemoryScanFetcher, NamedQuery};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let engine = AnalysisEngine::new(
            Arc::new(InMemoryScanFetcher::new()),
            Arc::new(InMemoryEligibilityProvider::unavailable()),
            Arc::new(CompositeScoreStrategy::new(CompositeScorer::new(
                ScoringConfig::with_max_hits(1).unwrap(),
            ))),
            AnalysisConfig::new(
                vec![NamedQuery::new("only", "( {cash} ( latest close > 1 ) )")],
                5,
            ),
        );
        create_router(Arc::new(AppState::new(Arc::new(engine))))
    }

    #[tokio::test]
    async fn root_is_alive() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let response = app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn post_is_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/analyze")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
