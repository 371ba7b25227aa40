//! # Ranking Strategy
//!
//! Strategies for ordering candidates.
//!
//! This module provides the [`RankingStrategy`] trait and the
//! [`CompositeScoreStrategy`] used in production, plus
//! [`rank_and_select`] which ranks and keeps the top N.
//!
//! # Ordering
//!
//! Candidates are sorted by score, highest first. Equal scores are broken
//! by symbol in ascending lexical order so that the same input always
//! yields the same ranking.

use crate::domain::entities::aggregated_record::AggregatedRecord;
use crate::domain::services::scoring::{CompositeScorer, ScoreBreakdown};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::info;

/// A candidate with its ranking information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// The scored record.
    pub record: AggregatedRecord,
    /// The rank (1 = best).
    pub rank: usize,
    /// Per-factor scores behind the rank.
    pub breakdown: ScoreBreakdown,
}

impl RankedCandidate {
    /// Creates a new ranked candidate.
    #[must_use]
    pub fn new(record: AggregatedRecord, rank: usize, breakdown: ScoreBreakdown) -> Self {
        Self {
            record,
            rank,
            breakdown,
        }
    }

    /// Returns true if this candidate is the best (rank 1).
    #[must_use]
    pub fn is_best(&self) -> bool {
        self.rank == 1
    }

    /// Composite score.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.breakdown.composite
    }
}

impl fmt::Display for RankedCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RankedCandidate(#{} {} {})",
            self.rank,
            self.record.symbol(),
            self.breakdown
        )
    }
}

/// Trait for ranking strategies.
pub trait RankingStrategy: Send + Sync + fmt::Debug {
    /// Scores and orders every record, best first.
    ///
    /// Each returned record carries its score. The output has the same
    /// length as the input.
    fn rank(&self, records: Vec<AggregatedRecord>) -> Vec<RankedCandidate>;

    /// Returns the name of this ranking strategy.
    fn name(&self) -> &'static str;
}

/// Ranks by the weighted composite score.
#[derive(Debug, Clone)]
pub struct CompositeScoreStrategy {
    scorer: CompositeScorer,
}

impl CompositeScoreStrategy {
    /// Creates a new composite score strategy.
    #[must_use]
    pub fn new(scorer: CompositeScorer) -> Self {
        Self { scorer }
    }

    /// Returns the scorer.
    #[must_use]
    pub fn scorer(&self) -> &CompositeScorer {
        &self.scorer
    }
}

/// Score descending, then symbol ascending.
fn by_score_then_symbol(
    a: &(AggregatedRecord, ScoreBreakdown),
    b: &(AggregatedRecord, ScoreBreakdown),
) -> Ordering {
    b.1.composite
        .total_cmp(&a.1.composite)
        .then_with(|| a.0.symbol().cmp(b.0.symbol()))
}

impl RankingStrategy for CompositeScoreStrategy {
    fn rank(&self, records: Vec<AggregatedRecord>) -> Vec<RankedCandidate> {
        let mut scored: Vec<(AggregatedRecord, ScoreBreakdown)> = records
            .into_iter()
            .map(|mut record| {
                let breakdown = self.scorer.breakdown(&record);
                record.set_score(breakdown.composite);
                (record, breakdown)
            })
            .collect();

        scored.sort_by(by_score_then_symbol);

        scored
            .into_iter()
            .enumerate()
            .map(|(i, (record, breakdown))| RankedCandidate::new(record, i + 1, breakdown))
            .collect()
    }

    fn name(&self) -> &'static str {
        "CompositeScore"
    }
}

/// Ranks `records` and keeps the best `top_n`.
///
/// Returns `min(top_n, records.len())` candidates.
#[must_use]
pub fn rank_and_select(
    strategy: &dyn RankingStrategy,
    records: Vec<AggregatedRecord>,
    top_n: usize,
) -> Vec<RankedCandidate> {
    let total = records.len();
    let mut ranked = strategy.rank(records);
    ranked.truncate(top_n);
    info!(
        selected = ranked.len(),
        candidates = total,
        strategy = strategy.name(),
        "top candidates selected"
    );
    ranked
}
