//! # Bootstrap
//!
//! Wires the production adapters into an [`AnalysisEngine`].

use crate::application::services::analysis::AnalysisEngine;
use crate::application::services::ranking_strategy::CompositeScoreStrategy;
use crate::config::{ConfigError, ScannerConfig};
use crate::domain::services::scoring::CompositeScorer;
use crate::infrastructure::eligibility::{EligibilityError, NseFoListProvider};
use crate::infrastructure::http::UpstreamError;
use crate::infrastructure::scanners::ChartinkFetcher;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Error raised while assembling the engine.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The screener client could not be built.
    #[error("failed to build screener client: {0}")]
    Scanner(#[from] UpstreamError),

    /// The eligibility provider could not be built.
    #[error("failed to build eligibility provider: {0}")]
    Eligibility(#[from] EligibilityError),
}

/// Builds the engine backed by Chartink and the NSE F&O list.
///
/// # Errors
///
/// Returns `BootstrapError` if the configuration fails validation or an
/// HTTP client cannot be constructed.
pub fn build_engine(config: &ScannerConfig) -> Result<AnalysisEngine, BootstrapError> {
    config.validate()?;
    let scorer = CompositeScorer::new(config.scoring_config()?);
    let fetcher = ChartinkFetcher::new(config.chartink_config())?;
    let eligibility = NseFoListProvider::new(config.nse_config())?;

    info!(
        queries = config.scan.queries.len(),
        top_n = config.scoring.top_n,
        base_url = %config.scan.base_url,
        cache_file = %config.eligibility.cache_file.display(),
        "Engine assembled"
    );

    Ok(AnalysisEngine::new(
        Arc::new(fetcher),
        Arc::new(eligibility),
        Arc::new(CompositeScoreStrategy::new(scorer)),
        config.analysis_config(),
    ))
}
