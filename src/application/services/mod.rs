//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! This module provides application-level services including:
//! - [`Aggregator`]: Merges scan rows into per-symbol records
//! - [`RankingStrategy`]: Strategies for ranking candidates
//! - [`AnalysisEngine`]: The end-to-end pipeline for one request

pub mod aggregation;
pub mod analysis;
pub mod ranking_strategy;

pub use aggregation::{
    AggregatedSet, AggregationStats, Aggregator, FirstSightingWins, LatestWins, MergePolicy,
    RunningAverage,
};
pub use analysis::{AnalysisConfig, AnalysisEngine, AnalysisOutcome, AnalysisReport};
pub use ranking_strategy::{
    CompositeScoreStrategy, RankedCandidate, RankingStrategy, rank_and_select,
};
