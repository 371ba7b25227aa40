//! Property tests for aggregation, scoring, ranking and hints.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use options_scanner::application::services::{
    Aggregator, CompositeScoreStrategy, RankedCandidate, rank_and_select,
};
use options_scanner::domain::entities::{RawMatch, ScanOutput, ScanResults};
use options_scanner::domain::services::hint::{HEAVY_VOLUME_RATIO, STRONG_MOVE_PCT};
use options_scanner::domain::services::{CompositeScorer, ScoringConfig, strategy_hint};
use options_scanner::domain::value_objects::{DirectionalHint, Symbol};
use proptest::prelude::*;
use std::collections::HashSet;

// =============================================================================
// Generators
// =============================================================================

fn arb_row() -> impl Strategy<Value = RawMatch> {
    (
        "[A-Za-z]{1,4}",
        1.0f64..10_000.0,
        0.0f64..1.0e7,
        0.0f64..20.0,
        -15.0f64..15.0,
    )
        .prop_map(|(symbol, close, volume, ratio, change)| {
            RawMatch::new(symbol, close, volume, ratio, change)
        })
}

fn arb_results(max_scans: usize) -> impl Strategy<Value = ScanResults> {
    proptest::collection::vec(proptest::collection::vec(arb_row(), 0..12), 1..=max_scans)
        .prop_map(|scans| {
            scans
                .into_iter()
                .enumerate()
                .map(|(i, rows)| ScanOutput::new(format!("scan_{i}"), rows))
                .collect::<ScanResults>()
        })
}

fn scorer(max_hits: usize) -> CompositeScorer {
    CompositeScorer::new(ScoringConfig::with_max_hits(max_hits).unwrap())
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// One record per distinct normalized symbol, each hit count bounded
    /// by the number of scans and equal to its distinct scanner list.
    #[test]
    fn prop_aggregation_is_per_symbol(results in arb_results(4)) {
        let set = Aggregator::default().aggregate(&results);

        let expected: HashSet<String> = results
            .iter()
            .flat_map(|scan| scan.matches.iter())
            .filter_map(|row| Symbol::parse(row.raw_symbol()))
            .map(Symbol::into_inner)
            .collect();
        prop_assert_eq!(set.len(), expected.len());

        for record in set.iter() {
            prop_assert!(record.hit_count() >= 1);
            prop_assert!(record.hit_count() <= results.len());
            prop_assert_eq!(record.hit_count(), record.scanners_hit().len());
            let unique: HashSet<&String> = record.scanners_hit().iter().collect();
            prop_assert_eq!(unique.len(), record.scanners_hit().len());
        }
    }

    /// Filtering keeps exactly the eligible symbols.
    #[test]
    fn prop_filter_keeps_only_eligible(
        results in arb_results(3),
        eligible in proptest::collection::hash_set("[A-Z]{1,4}", 0..20),
    ) {
        let eligible: HashSet<Symbol> = eligible
            .iter()
            .filter_map(|s| Symbol::parse(s))
            .collect();
        let all = Aggregator::default().aggregate(&results);
        let before: HashSet<Symbol> = all.symbols().cloned().collect();
        let kept = all.retain_eligible(&eligible);

        for symbol in kept.symbols() {
            prop_assert!(eligible.contains(symbol));
        }
        prop_assert_eq!(kept.len(), before.intersection(&eligible).count());
    }

    /// Scores stay within [0, 100] with one decimal.
    #[test]
    fn prop_score_is_bounded(
        hits in 0usize..6,
        ratio in -5.0f64..50.0,
        price in -100.0f64..20_000.0,
    ) {
        let breakdown = scorer(3).breakdown_for(hits, ratio, price);
        prop_assert!((0.0..=100.0).contains(&breakdown.composite));
        let tenths = breakdown.composite * 10.0;
        prop_assert!((tenths - tenths.round()).abs() < 1e-6);
        for factor in [breakdown.scanner_count, breakdown.volume_ratio, breakdown.price_range] {
            prop_assert!((0.0..=1.0).contains(&factor));
        }
    }

    /// Selection returns at most `top_n` picks, ranked 1.., score descending.
    #[test]
    fn prop_selection_is_sorted_and_bounded(
        results in arb_results(3),
        top_n in 1usize..8,
    ) {
        let records = Aggregator::default().aggregate(&results).into_records();
        let total = records.len();
        let strategy = CompositeScoreStrategy::new(scorer(results.len()));
        let picks = rank_and_select(&strategy, records, top_n);

        prop_assert_eq!(picks.len(), total.min(top_n));
        for (i, pick) in picks.iter().enumerate() {
            prop_assert_eq!(pick.rank, i + 1);
        }
        for pair in picks.windows(2) {
            prop_assert!(pair[0].score() >= pair[1].score());
        }
    }

    /// Raising any single input never lowers the composite.
    #[test]
    fn prop_score_is_monotonic_per_input(
        hits in 0usize..4,
        ratio in 0.0f64..8.0,
        ratio_bump in 0.0f64..4.0,
        price in 100.0f64..200.0,
        price_bump in 0.0f64..100.0,
    ) {
        let scorer = scorer(3);
        let base = scorer.breakdown_for(hits, ratio, price).composite;

        let more_hits = scorer.breakdown_for(hits + 1, ratio, price).composite;
        prop_assert!(more_hits >= base, "hits {} -> {}: {} < {}", hits, hits + 1, more_hits, base);

        let more_volume = scorer.breakdown_for(hits, ratio + ratio_bump, price).composite;
        prop_assert!(more_volume >= base, "ratio {} +{}: {} < {}", ratio, ratio_bump, more_volume, base);

        // stays on the lower ramp, below the sweet spot
        let higher_price = (price + price_bump).min(200.0);
        let closer_to_sweet_spot = scorer.breakdown_for(hits, ratio, higher_price).composite;
        prop_assert!(
            closer_to_sweet_spot >= base,
            "price {} -> {}: {} < {}", price, higher_price, closer_to_sweet_spot, base
        );
    }

    /// Input order of the records does not change the selection.
    #[test]
    fn prop_selection_ignores_input_order(
        results in arb_results(3),
        keys in proptest::collection::vec(any::<u32>(), 1..32),
        top_n in 1usize..8,
    ) {
        let records = Aggregator::default().aggregate(&results).into_records();
        let mut shuffled: Vec<_> = records.iter().cloned().enumerate().collect();
        shuffled.sort_by_key(|(i, _)| (keys[i % keys.len()], *i));
        let shuffled: Vec<_> = shuffled.into_iter().map(|(_, record)| record).collect();

        let strategy = CompositeScoreStrategy::new(scorer(results.len()));
        let picks = rank_and_select(&strategy, records, top_n);
        let shuffled_picks = rank_and_select(&strategy, shuffled, top_n);

        let summary = |picks: &[RankedCandidate]| {
            picks
                .iter()
                .map(|p| (p.rank, p.record.symbol().to_string(), p.score()))
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(summary(&picks), summary(&shuffled_picks));
    }

    /// Hints follow the strong-move and heavy-volume thresholds.
    #[test]
    fn prop_hint_thresholds(change in -10.0f64..10.0, ratio in 0.0f64..10.0) {
        let expected = if ratio > HEAVY_VOLUME_RATIO && change > STRONG_MOVE_PCT {
            DirectionalHint::Bullish
        } else if ratio > HEAVY_VOLUME_RATIO && change < -STRONG_MOVE_PCT {
            DirectionalHint::Bearish
        } else {
            DirectionalHint::Neutral
        };
        prop_assert_eq!(strategy_hint(change, ratio), expected);
    }
}
