//! # Strategy Hint
//!
//! Derives a [`DirectionalHint`] from the day's price change and relative
//! volume. Pure and total: any input, including NaN, produces a hint.

use crate::domain::entities::aggregated_record::AggregatedRecord;
use crate::domain::value_objects::hint::DirectionalHint;

/// Absolute percent change that counts as a strong move.
pub const STRONG_MOVE_PCT: f64 = 1.5;

/// Relative volume that counts as heavy.
pub const HEAVY_VOLUME_RATIO: f64 = 1.5;

/// Classifies a move.
///
/// Both thresholds are strict: a change of exactly `1.5` is neutral.
///
/// # Examples
///
/// ```
/// use options_scanner::domain::services::hint::strategy_hint;
/// use options_scanner::domain::value_objects::hint::DirectionalHint;
///
/// assert_eq!(strategy_hint(2.0, 2.0), DirectionalHint::Bullish);
/// assert_eq!(strategy_hint(-2.0, 2.0), DirectionalHint::Bearish);
/// assert_eq!(strategy_hint(2.0, 1.0), DirectionalHint::Neutral);
/// ```
#[must_use]
pub fn strategy_hint(change_pct: f64, volume_ratio: f64) -> DirectionalHint {
    let heavy_volume = volume_ratio > HEAVY_VOLUME_RATIO;
    if change_pct > STRONG_MOVE_PCT && heavy_volume {
        DirectionalHint::Bullish
    } else if change_pct < -STRONG_MOVE_PCT && heavy_volume {
        DirectionalHint::Bearish
    } else {
        DirectionalHint::Neutral
    }
}

/// Classifies a record.
#[must_use]
pub fn hint_for(record: &AggregatedRecord) -> DirectionalHint {
    strategy_hint(record.change_pct(), record.volume_ratio())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::aggregated_record::MarketSnapshot;
    use crate::domain::value_objects::symbol::Symbol;

    #[test]
    fn classification_table() {
        assert_eq!(strategy_hint(2.0, 2.0), DirectionalHint::Bullish);
        assert_eq!(strategy_hint(-2.0, 2.0), DirectionalHint::Bearish);
        assert_eq!(strategy_hint(0.5, 2.0), DirectionalHint::Neutral);
        assert_eq!(strategy_hint(2.0, 1.0), DirectionalHint::Neutral);
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(strategy_hint(1.5, 2.0), DirectionalHint::Neutral);
        assert_eq!(strategy_hint(-1.5, 2.0), DirectionalHint::Neutral);
        assert_eq!(strategy_hint(2.0, 1.5), DirectionalHint::Neutral);
    }

    #[test]
    fn total_over_odd_inputs() {
        assert_eq!(strategy_hint(5.0, 0.0), DirectionalHint::Neutral);
        assert_eq!(strategy_hint(-5.0, -3.0), DirectionalHint::Neutral);
        assert_eq!(strategy_hint(f64::NAN, 2.0), DirectionalHint::Neutral);
        assert_eq!(strategy_hint(2.0, f64::NAN), DirectionalHint::Neutral);
    }

    #[test]
    fn hint_for_record() {
        let record = AggregatedRecord::first_sighting(
            Symbol::parse("SBIN").unwrap(),
            MarketSnapshot::new(800.0, 1.0e6, 3.2, -2.4),
            "volume_breakout",
        );
        assert_eq!(hint_for(&record), DirectionalHint::Bearish);
    }
}
