//! # Analysis Engine
//!
//! Runs the full pipeline for one request.
//!
//! The [`AnalysisEngine`] loads the eligibility set, fetches every
//! configured scan, aggregates the rows per symbol, drops ineligible
//! symbols, ranks the rest and attaches a directional hint to each pick.
//!
//! # Outcomes
//!
//! - Eligibility set empty: [`AnalysisError::EligibilityUnavailable`]
//! - Every scan returned zero rows: [`AnalysisError::NoScanResults`]
//! - Candidates found but none eligible: [`AnalysisOutcome::NoEligibleCandidates`]
//! - Otherwise: [`AnalysisOutcome::Ranked`]

use crate::application::error::{AnalysisError, AnalysisResult};
use crate::application::services::aggregation::{AggregationStats, Aggregator};
use crate::application::services::ranking_strategy::{
    RankedCandidate, RankingStrategy, rank_and_select,
};
use crate::domain::services::hint::hint_for;
use crate::infrastructure::eligibility::traits::EligibilityProvider;
use crate::infrastructure::scanners::traits::{NamedQuery, ScanFetcher};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Default number of picks returned.
pub const DEFAULT_TOP_N: usize = 5;

/// Settings for an analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Scans to run, in reporting order.
    pub queries: Vec<NamedQuery>,
    /// Maximum number of picks.
    pub top_n: usize,
}

impl AnalysisConfig {
    /// Creates a configuration.
    #[must_use]
    pub fn new(queries: Vec<NamedQuery>, top_n: usize) -> Self {
        Self { queries, top_n }
    }

    /// Sets the number of picks.
    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}

/// Result of a run that produced picks.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Run identifier, also recorded on the run's tracing span.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Distinct symbols found across all scans.
    pub total_candidates: usize,
    /// Symbols that passed the eligibility filter.
    pub eligible_count: usize,
    /// Best candidates, rank 1 first. Every record carries a score and hint.
    pub picks: Vec<RankedCandidate>,
    /// Row accounting from aggregation.
    pub stats: AggregationStats,
}

impl AnalysisReport {
    /// Elapsed seconds rounded to one decimal.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        (self.elapsed.as_secs_f64() * 10.0).round() / 10.0
    }

    /// Returns the best pick, if any.
    #[must_use]
    pub fn best_pick(&self) -> Option<&RankedCandidate> {
        self.picks.first()
    }
}

/// Successful result of a run.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// Scans produced candidates but none is eligible.
    NoEligibleCandidates {
        /// Run identifier.
        run_id: Uuid,
        /// When the run started.
        started_at: DateTime<Utc>,
        /// Distinct symbols found across all scans.
        total_candidates: usize,
    },
    /// Candidates were ranked.
    Ranked(AnalysisReport),
}

impl AnalysisOutcome {
    /// Returns the run identifier.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        match self {
            Self::NoEligibleCandidates { run_id, .. } => *run_id,
            Self::Ranked(report) => report.run_id,
        }
    }

    /// Returns the report if candidates were ranked.
    #[must_use]
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            Self::Ranked(report) => Some(report),
            Self::NoEligibleCandidates { .. } => None,
        }
    }
}

/// Engine that sequences fetch, aggregate, filter, rank and hint.
#[derive(Debug)]
pub struct AnalysisEngine {
    scan_fetcher: Arc<dyn ScanFetcher>,
    eligibility: Arc<dyn EligibilityProvider>,
    ranking_strategy: Arc<dyn RankingStrategy>,
    aggregator: Aggregator,
    config: AnalysisConfig,
}

impl AnalysisEngine {
    /// Creates a new engine with the default aggregator.
    #[must_use]
    pub fn new(
        scan_fetcher: Arc<dyn ScanFetcher>,
        eligibility: Arc<dyn EligibilityProvider>,
        ranking_strategy: Arc<dyn RankingStrategy>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            scan_fetcher,
            eligibility,
            ranking_strategy,
            aggregator: Aggregator::default(),
            config,
        }
    }

    /// Replaces the aggregator.
    #[must_use]
    pub fn with_aggregator(mut self, aggregator: Aggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Returns the ranking strategy name.
    #[must_use]
    pub fn ranking_strategy_name(&self) -> &'static str {
        self.ranking_strategy.name()
    }

    /// Runs the pipeline once.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The eligibility set is empty
    /// - Every scan returned zero rows
    pub async fn run(&self) -> AnalysisResult<AnalysisOutcome> {
        let run_id = Uuid::new_v4();
        let span = info_span!("analysis", %run_id);
        self.run_inner(run_id).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid) -> AnalysisResult<AnalysisOutcome> {
        let started = Instant::now();
        let started_at = Utc::now();
        info!(
            scanners = self.config.queries.len(),
            fetcher = self.scan_fetcher.name(),
            eligibility = self.eligibility.name(),
            "Analysis triggered"
        );

        let eligible = self.eligibility.eligible_symbols().await;
        if eligible.is_empty() {
            warn!("Eligibility set is empty");
            return Err(AnalysisError::eligibility_unavailable());
        }

        let results = self.scan_fetcher.fetch_all(&self.config.queries).await;
        if results.all_empty() {
            warn!(scanners = results.len(), "Every scanner came back empty");
            return Err(AnalysisError::no_scan_results(self.config.queries.len()));
        }

        let aggregated = self.aggregator.aggregate(&results);
        let total_candidates = aggregated.len();
        let stats = *aggregated.stats();

        let eligible_records = aggregated.retain_eligible(&eligible);
        if eligible_records.is_empty() {
            info!(total_candidates, "No candidate is eligible");
            return Ok(AnalysisOutcome::NoEligibleCandidates {
                run_id,
                started_at,
                total_candidates,
            });
        }
        let eligible_count = eligible_records.len();

        let mut picks = rank_and_select(
            self.ranking_strategy.as_ref(),
            eligible_records.into_records(),
            self.config.top_n,
        );
        for pick in &mut picks {
            let hint = hint_for(&pick.record);
            pick.record.set_hint(hint);
        }

        let elapsed = started.elapsed();
        info!(
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            total_candidates,
            eligible_count,
            picks = picks.len(),
            "Analysis complete"
        );

        Ok(AnalysisOutcome::Ranked(AnalysisReport {
            run_id,
            started_at,
            elapsed,
            total_candidates,
            eligible_count,
            picks,
            stats,
        }))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::application::services::ranking_strategy::CompositeScoreStrategy;
    use crate::domain::entities::raw_match::RawMatch;
    use crate::domain::services::scoring::{CompositeScorer, ScoringConfig};
    use crate::domain::value_objects::hint::DirectionalHint;
    use crate::infrastructure::eligibility::in_memory::InMemoryEligibilityProvider;
    use crate::infrastructure::scanners::in_memory::InMemoryScanFetcher;

    fn queries() -> Vec<NamedQuery> {
        ["volume_breakout", "rsi_momentum", "ema_crossover"]
            .into_iter()
            .map(|name| NamedQuery::new(name, format!("clause for {name}")))
            .collect()
    }

    fn strategy() -> Arc<dyn RankingStrategy> {
        let config = ScoringConfig::with_max_hits(3).unwrap();
        Arc::new(CompositeScoreStrategy::new(CompositeScorer::new(config)))
    }

    fn engine(fetcher: InMemoryScanFetcher, eligible: &[&str]) -> AnalysisEngine {
        AnalysisEngine::new(
            Arc::new(fetcher),
            Arc::new(InMemoryEligibilityProvider::new(eligible.iter().copied())),
            strategy(),
            AnalysisConfig::new(queries(), DEFAULT_TOP_N),
        )
    }

    #[tokio::test]
    async fn end_to_end_tcs() {
        let fetcher = InMemoryScanFetcher::new()
            .with_rows(
                "volume_breakout",
                vec![RawMatch::new("TCS", 1500.0, 1.0e6, 2.0, 2.0)],
            )
            .with_rows(
                "rsi_momentum",
                vec![RawMatch::new("tcs", 1510.0, 1.1e6, 2.2, 2.1)],
            );

        let outcome = engine(fetcher, &["TCS", "INFY"]).run().await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.total_candidates, 1);
        assert_eq!(report.eligible_count, 1);
        assert_eq!(report.picks.len(), 1);

        let tcs = &report.picks[0];
        assert_eq!(tcs.rank, 1);
        assert_eq!(tcs.record.symbol().as_str(), "TCS");
        assert_eq!(tcs.record.hit_count(), 2);
        assert_eq!(tcs.record.close(), 1500.0);
        assert_eq!(tcs.record.hint(), Some(DirectionalHint::Bullish));
        assert_eq!(tcs.record.scanners_hit(), ["volume_breakout", "rsi_momentum"]);
        assert!(tcs.record.score().is_some());
    }

    #[tokio::test]
    async fn empty_eligibility_is_unavailable() {
        let fetcher = InMemoryScanFetcher::new().with_rows(
            "volume_breakout",
            vec![RawMatch::new("TCS", 1500.0, 1.0e6, 2.0, 2.0)],
        );
        let err = engine(fetcher, &[]).run().await.unwrap_err();
        assert_eq!(err, AnalysisError::EligibilityUnavailable);
    }

    #[tokio::test]
    async fn eligibility_checked_before_scanning() {
        let fetcher = Arc::new(InMemoryScanFetcher::new());
        let engine = AnalysisEngine::new(
            Arc::clone(&fetcher) as Arc<dyn ScanFetcher>,
            Arc::new(InMemoryEligibilityProvider::unavailable()),
            strategy(),
            AnalysisConfig::new(queries(), 5),
        );

        assert!(engine.run().await.is_err());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn all_scans_empty_is_unavailable() {
        let err = engine(InMemoryScanFetcher::new(), &["TCS"])
            .run()
            .await
            .unwrap_err();
        assert_eq!(err, AnalysisError::NoScanResults { queries: 3 });
    }

    #[tokio::test]
    async fn none_eligible() {
        let fetcher = InMemoryScanFetcher::new().with_rows(
            "ema_crossover",
            vec![
                RawMatch::new("SMALLCAP", 150.0, 1.0e5, 3.0, 4.0),
                RawMatch::new("OTHER", 250.0, 1.0e5, 3.0, 4.0),
            ],
        );

        let outcome = engine(fetcher, &["TCS"]).run().await.unwrap();
        match outcome {
            AnalysisOutcome::NoEligibleCandidates {
                total_candidates, ..
            } => assert_eq!(total_candidates, 2),
            AnalysisOutcome::Ranked(_) => panic!("expected no eligible candidates"),
        }
    }

    #[tokio::test]
    async fn picks_limited_to_top_n_and_sorted() {
        let rows: Vec<RawMatch> = (0..8)
            .map(|i| {
                RawMatch::new(
                    format!("SYM{i}"),
                    300.0 + f64::from(i) * 10.0,
                    1.0e6,
                    1.0 + f64::from(i) * 0.4,
                    1.0,
                )
            })
            .collect();
        let symbols: Vec<String> = (0..8).map(|i| format!("SYM{i}")).collect();
        let eligible: Vec<&str> = symbols.iter().map(String::as_str).collect();

        let fetcher = InMemoryScanFetcher::new().with_rows("volume_breakout", rows);
        let outcome = engine(fetcher, &eligible).run().await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.eligible_count, 8);
        assert_eq!(report.picks.len(), 5);
        assert_eq!(report.best_pick().unwrap().record.symbol().as_str(), "SYM7");
        assert!(report.picks.windows(2).all(|w| w[0].score() >= w[1].score()));
        assert!(report.picks.iter().all(|p| p.record.hint().is_some()));
    }

    #[test]
    fn elapsed_seconds_rounding() {
        let report = AnalysisReport {
            run_id: Uuid::nil(),
            started_at: Utc::now(),
            elapsed: Duration::from_millis(12_345),
            total_candidates: 0,
            eligible_count: 0,
            picks: Vec::new(),
            stats: AggregationStats::default(),
        };
        assert!((report.elapsed_seconds() - 12.3).abs() < 1e-9);
    }
}
