//! # Composite Scoring
//!
//! Normalizes a candidate's signals to `[0, 1]` and blends them into a
//! single `0..=100` score.
//!
//! # Factors
//!
//! | Factor        | Normalization                                         |
//! |---------------|-------------------------------------------------------|
//! | Scanner hits  | `min(hits / max_possible_hits, 1)`                    |
//! | Volume ratio  | `0` at or below baseline, linear to `1` at `baseline + span` |
//! | Price range   | `1` in the sweet spot, linear ramps to `0` at the bounds |
//!
//! The composite is `round1(100 * Σ weight_i * factor_i)`. No clamping is
//! applied afterwards: [`ScoreWeights`] can only be built when the weights
//! are non-negative and sum to one, which keeps the result in `[0, 100]`.

use crate::domain::entities::aggregated_record::AggregatedRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Allowed drift when checking that the weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Lower edge of the default sweet spot.
pub const DEFAULT_SWEET_SPOT_LOW: f64 = 200.0;

/// Upper edge of the default sweet spot.
pub const DEFAULT_SWEET_SPOT_HIGH: f64 = 2000.0;

/// Invalid scoring configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringConfigError {
    /// A weight is negative or not finite.
    #[error("weight `{factor}` must be a finite non-negative number, got {value}")]
    InvalidWeight {
        /// Factor name.
        factor: &'static str,
        /// Offending value.
        value: f64,
    },

    /// The weights do not add up to one.
    #[error("score weights must sum to 1.0, got {sum}")]
    WeightsDoNotSumToOne {
        /// Actual sum.
        sum: f64,
    },

    /// Price bands are not ordered `min < sweet_low <= sweet_high < max`.
    #[error(
        "price bands must satisfy min < sweet_low <= sweet_high < max, got [{min}, {sweet_low}, {sweet_high}, {max}]"
    )]
    InvalidPriceBands {
        /// Minimum tradeable price.
        min: f64,
        /// Sweet spot lower edge.
        sweet_low: f64,
        /// Sweet spot upper edge.
        sweet_high: f64,
        /// Maximum tradeable price.
        max: f64,
    },

    /// The hit ceiling is zero.
    #[error("max possible hits must be at least 1")]
    ZeroHitCeiling,

    /// Volume saturation constants are unusable.
    #[error("volume saturation needs a finite baseline and a positive span, got baseline={baseline} span={span}")]
    InvalidVolumeSaturation {
        /// Baseline ratio.
        baseline: f64,
        /// Ramp width.
        span: f64,
    },
}

/// Relative importance of each factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    scanner_count: f64,
    volume_ratio: f64,
    price_range: f64,
}

impl ScoreWeights {
    /// Creates validated weights.
    ///
    /// # Errors
    ///
    /// - [`ScoringConfigError::InvalidWeight`] for a negative or non-finite weight
    /// - [`ScoringConfigError::WeightsDoNotSumToOne`] when the sum is off by
    ///   more than [`WEIGHT_SUM_TOLERANCE`]
    pub fn new(
        scanner_count: f64,
        volume_ratio: f64,
        price_range: f64,
    ) -> Result<Self, ScoringConfigError> {
        for (factor, value) in [
            ("scanner_count", scanner_count),
            ("volume_ratio", volume_ratio),
            ("price_range", price_range),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringConfigError::InvalidWeight { factor, value });
            }
        }

        let sum = scanner_count + volume_ratio + price_range;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringConfigError::WeightsDoNotSumToOne { sum });
        }

        Ok(Self {
            scanner_count,
            volume_ratio,
            price_range,
        })
    }

    /// Weight of the scanner-hit factor.
    #[inline]
    #[must_use]
    pub fn scanner_count(&self) -> f64 {
        self.scanner_count
    }

    /// Weight of the volume-ratio factor.
    #[inline]
    #[must_use]
    pub fn volume_ratio(&self) -> f64 {
        self.volume_ratio
    }

    /// Weight of the price-range factor.
    #[inline]
    #[must_use]
    pub fn price_range(&self) -> f64 {
        self.price_range
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            scanner_count: 0.40,
            volume_ratio: 0.35,
            price_range: 0.25,
        }
    }
}

/// Tradeable price bounds with a preferred sub-range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBands {
    min: f64,
    sweet_low: f64,
    sweet_high: f64,
    max: f64,
}

impl PriceBands {
    /// Creates validated price bands.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringConfigError::InvalidPriceBands`] unless
    /// `min < sweet_low <= sweet_high < max` and all values are finite.
    pub fn new(
        min: f64,
        sweet_low: f64,
        sweet_high: f64,
        max: f64,
    ) -> Result<Self, ScoringConfigError> {
        let finite = [min, sweet_low, sweet_high, max]
            .iter()
            .all(|v| v.is_finite());
        if !finite || !(min < sweet_low && sweet_low <= sweet_high && sweet_high < max) {
            return Err(ScoringConfigError::InvalidPriceBands {
                min,
                sweet_low,
                sweet_high,
                max,
            });
        }
        Ok(Self {
            min,
            sweet_low,
            sweet_high,
            max,
        })
    }

    /// Creates bands with the default `[200, 2000]` sweet spot.
    ///
    /// # Errors
    ///
    /// Same as [`PriceBands::new`].
    pub fn with_default_sweet_spot(min: f64, max: f64) -> Result<Self, ScoringConfigError> {
        Self::new(min, DEFAULT_SWEET_SPOT_LOW, DEFAULT_SWEET_SPOT_HIGH, max)
    }

    /// Minimum tradeable price.
    #[inline]
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum tradeable price.
    #[inline]
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Sweet spot as `(low, high)`.
    #[inline]
    #[must_use]
    pub fn sweet_spot(&self) -> (f64, f64) {
        (self.sweet_low, self.sweet_high)
    }

    /// Returns true when `price` lies within `[min, max]`.
    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

impl Default for PriceBands {
    fn default() -> Self {
        Self {
            min: 100.0,
            sweet_low: DEFAULT_SWEET_SPOT_LOW,
            sweet_high: DEFAULT_SWEET_SPOT_HIGH,
            max: 5000.0,
        }
    }
}

/// Volume-ratio ramp: `0` at `baseline`, `1` at `baseline + span`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeSaturation {
    baseline: f64,
    span: f64,
}

impl VolumeSaturation {
    /// Creates a validated ramp.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringConfigError::InvalidVolumeSaturation`] for a
    /// non-finite baseline or a non-positive span.
    pub fn new(baseline: f64, span: f64) -> Result<Self, ScoringConfigError> {
        if !baseline.is_finite() || !span.is_finite() || span <= 0.0 {
            return Err(ScoringConfigError::InvalidVolumeSaturation { baseline, span });
        }
        Ok(Self { baseline, span })
    }

    /// Ratio that scores zero.
    #[inline]
    #[must_use]
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Distance above baseline at which the score saturates.
    #[inline]
    #[must_use]
    pub fn span(&self) -> f64 {
        self.span
    }
}

impl Default for VolumeSaturation {
    fn default() -> Self {
        Self {
            baseline: 1.0,
            span: 4.0,
        }
    }
}

/// Immutable scoring parameters, validated once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    weights: ScoreWeights,
    bands: PriceBands,
    volume: VolumeSaturation,
    max_possible_hits: usize,
}

impl ScoringConfig {
    /// Creates a scoring configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringConfigError::ZeroHitCeiling`] when
    /// `max_possible_hits` is zero.
    pub fn new(
        weights: ScoreWeights,
        bands: PriceBands,
        volume: VolumeSaturation,
        max_possible_hits: usize,
    ) -> Result<Self, ScoringConfigError> {
        if max_possible_hits == 0 {
            return Err(ScoringConfigError::ZeroHitCeiling);
        }
        Ok(Self {
            weights,
            bands,
            volume,
            max_possible_hits,
        })
    }

    /// Default parameters with the given hit ceiling.
    ///
    /// # Errors
    ///
    /// Same as [`ScoringConfig::new`].
    pub fn with_max_hits(max_possible_hits: usize) -> Result<Self, ScoringConfigError> {
        Self::new(
            ScoreWeights::default(),
            PriceBands::default(),
            VolumeSaturation::default(),
            max_possible_hits,
        )
    }

    /// Factor weights.
    #[inline]
    #[must_use]
    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Price bands.
    #[inline]
    #[must_use]
    pub fn bands(&self) -> &PriceBands {
        &self.bands
    }

    /// Volume ramp.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> &VolumeSaturation {
        &self.volume
    }

    /// Number of scans a symbol can possibly hit.
    #[inline]
    #[must_use]
    pub fn max_possible_hits(&self) -> usize {
        self.max_possible_hits
    }
}

/// Scanner-hit factor.
///
/// A zero ceiling yields `0.0`; [`ScoringConfig`] never carries one.
#[must_use]
pub fn normalize_hit_count(hits: usize, max_possible_hits: usize) -> f64 {
    if max_possible_hits == 0 {
        return 0.0;
    }
    (hits as f64 / max_possible_hits as f64).min(1.0)
}

/// Volume-ratio factor.
#[must_use]
pub fn normalize_volume_ratio(ratio: f64, volume: &VolumeSaturation) -> f64 {
    if !ratio.is_finite() || ratio <= volume.baseline {
        return 0.0;
    }
    ((ratio - volume.baseline) / volume.span).min(1.0)
}

/// Price-range factor.
///
/// Prices outside `[min, max]` get no credit; this does not remove the
/// candidate, it only zeroes this factor.
#[must_use]
pub fn normalize_price(price: f64, bands: &PriceBands) -> f64 {
    if !price.is_finite() || !bands.contains(price) {
        return 0.0;
    }
    if price >= bands.sweet_low && price <= bands.sweet_high {
        return 1.0;
    }
    if price < bands.sweet_low {
        return (price - bands.min) / (bands.sweet_low - bands.min);
    }
    1.0 - (price - bands.sweet_high) / (bands.max - bands.sweet_high)
}

/// Rounds to one decimal place.
///
/// Works on the exact decimal expansion of `value`, so `28.849999999999998`
/// becomes `28.8`. Scaling by ten first would round it up.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Per-factor view of a score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Scanner-hit factor in `[0, 1]`.
    pub scanner_count: f64,
    /// Volume-ratio factor in `[0, 1]`.
    pub volume_ratio: f64,
    /// Price-range factor in `[0, 1]`.
    pub price_range: f64,
    /// Weighted composite in `[0, 100]`, one decimal.
    pub composite: f64,
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "score={:.1} (hits={:.3} volume={:.3} price={:.3})",
            self.composite, self.scanner_count, self.volume_ratio, self.price_range
        )
    }
}

/// Blends factor scores with fixed weights.
///
/// # Examples
///
/// ```
/// use options_scanner::domain::services::scoring::{CompositeScorer, ScoringConfig};
///
/// let scorer = CompositeScorer::new(ScoringConfig::with_max_hits(3).unwrap());
/// // 2 of 3 scans, 2x volume, price in the sweet spot
/// let breakdown = scorer.breakdown_for(2, 2.0, 1500.0);
/// assert_eq!(breakdown.composite, 60.4);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CompositeScorer {
    config: ScoringConfig,
}

impl CompositeScorer {
    /// Creates a scorer.
    #[must_use]
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration in use.
    #[must_use]
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores raw signal values.
    #[must_use]
    pub fn breakdown_for(&self, hits: usize, volume_ratio: f64, price: f64) -> ScoreBreakdown {
        let scanner_count = normalize_hit_count(hits, self.config.max_possible_hits);
        let volume_ratio = normalize_volume_ratio(volume_ratio, &self.config.volume);
        let price_range = normalize_price(price, &self.config.bands);

        let w = &self.config.weights;
        let weighted = w.scanner_count * scanner_count
            + w.volume_ratio * volume_ratio
            + w.price_range * price_range;

        ScoreBreakdown {
            scanner_count,
            volume_ratio,
            price_range,
            composite: round_to_tenth(weighted * 100.0),
        }
    }

    /// Scores a record.
    #[must_use]
    pub fn breakdown(&self, record: &AggregatedRecord) -> ScoreBreakdown {
        self.breakdown_for(record.hit_count(), record.volume_ratio(), record.close())
    }

    /// Composite score of a record.
    #[must_use]
    pub fn score(&self, record: &AggregatedRecord) -> f64 {
        self.breakdown(record).composite
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn hit_count_normalization() {
        assert!(approx(normalize_hit_count(1, 3), 0.333));
        assert!(approx(normalize_hit_count(3, 3), 1.0));
        assert!(approx(normalize_hit_count(5, 3), 1.0));
        assert!(approx(normalize_hit_count(0, 3), 0.0));
        assert!(approx(normalize_hit_count(2, 0), 0.0));
    }

    #[test]
    fn volume_ratio_normalization() {
        let v = VolumeSaturation::default();
        assert!(approx(normalize_volume_ratio(1.0, &v), 0.0));
        assert!(approx(normalize_volume_ratio(0.5, &v), 0.0));
        assert!(approx(normalize_volume_ratio(-3.0, &v), 0.0));
        assert!(approx(normalize_volume_ratio(3.0, &v), 0.5));
        assert!(approx(normalize_volume_ratio(5.0, &v), 1.0));
        assert!(approx(normalize_volume_ratio(6.0, &v), 1.0));
        assert!(approx(normalize_volume_ratio(f64::NAN, &v), 0.0));
    }

    #[test]
    fn price_normalization() {
        let b = PriceBands::default();
        assert!(approx(normalize_price(150.0, &b), 0.5));
        assert!(approx(normalize_price(2500.0, &b), 0.833));
        assert!(approx(normalize_price(50.0, &b), 0.0));
        assert!(approx(normalize_price(2000.0, &b), 1.0));
        assert!(approx(normalize_price(200.0, &b), 1.0));
        assert!(approx(normalize_price(100.0, &b), 0.0));
        assert!(approx(normalize_price(5000.0, &b), 0.0));
        assert!(approx(normalize_price(5000.01, &b), 0.0));
        assert!(approx(normalize_price(f64::INFINITY, &b), 0.0));
    }

    #[test]
    fn weights_must_sum_to_one() {
        assert!(ScoreWeights::new(0.4, 0.35, 0.25).is_ok());
        assert!(matches!(
            ScoreWeights::new(0.5, 0.35, 0.25),
            Err(ScoringConfigError::WeightsDoNotSumToOne { .. })
        ));
    }

    #[test]
    fn weights_reject_negative() {
        assert!(matches!(
            ScoreWeights::new(1.2, -0.2, 0.0),
            Err(ScoringConfigError::InvalidWeight {
                factor: "volume_ratio",
                ..
            })
        ));
        assert!(ScoreWeights::new(f64::NAN, 0.5, 0.5).is_err());
    }

    #[test]
    fn price_bands_must_be_ordered() {
        assert!(PriceBands::new(100.0, 200.0, 2000.0, 5000.0).is_ok());
        assert!(PriceBands::new(100.0, 200.0, 200.0, 5000.0).is_ok());
        assert!(PriceBands::new(200.0, 200.0, 2000.0, 5000.0).is_err());
        assert!(PriceBands::new(100.0, 2000.0, 200.0, 5000.0).is_err());
        assert!(PriceBands::with_default_sweet_spot(100.0, 1500.0).is_err());
    }

    #[test]
    fn zero_hit_ceiling_is_rejected() {
        assert_eq!(
            ScoringConfig::with_max_hits(0).unwrap_err(),
            ScoringConfigError::ZeroHitCeiling
        );
    }

    #[test]
    fn volume_saturation_validation() {
        assert!(VolumeSaturation::new(1.0, 0.0).is_err());
        assert!(VolumeSaturation::new(f64::NAN, 4.0).is_err());
        assert!(VolumeSaturation::new(1.0, 4.0).is_ok());
    }

    #[test]
    fn composite_is_weighted_and_rounded() {
        let scorer = CompositeScorer::new(ScoringConfig::with_max_hits(3).unwrap());

        // hits 2/3, volume (2-1)/4 = 0.25, price 1.0
        // 0.4*0.6667 + 0.35*0.25 + 0.25*1.0 = 0.60417
        let b = scorer.breakdown_for(2, 2.0, 1500.0);
        assert!(approx(b.scanner_count, 0.6667));
        assert!(approx(b.volume_ratio, 0.25));
        assert!(approx(b.price_range, 1.0));
        assert!(approx(b.composite, 60.4));
    }

    #[test]
    fn rounding_uses_the_stored_value() {
        assert_eq!(round_to_tenth(28.849_999_999_999_998), 28.8);
        assert_eq!(round_to_tenth(60.416_666), 60.4);
        assert_eq!(round_to_tenth(73.75), 73.8);
        assert_eq!(round_to_tenth(0.0), 0.0);
        assert_eq!(round_to_tenth(100.0), 100.0);

        // 0.35 * 0.11 + 0.25 sits just below 28.85 after scaling
        let scorer = CompositeScorer::new(ScoringConfig::with_max_hits(3).unwrap());
        assert_eq!(scorer.breakdown_for(0, 1.44, 1500.0).composite, 28.8);
    }

    #[test]
    fn composite_bounds() {
        let scorer = CompositeScorer::new(ScoringConfig::with_max_hits(3).unwrap());
        assert!(approx(scorer.breakdown_for(3, 10.0, 1000.0).composite, 100.0));
        assert!(approx(scorer.breakdown_for(0, 0.0, 10.0).composite, 0.0));
    }

    #[test]
    fn breakdown_display() {
        let scorer = CompositeScorer::new(ScoringConfig::with_max_hits(3).unwrap());
        let text = scorer.breakdown_for(3, 5.0, 1000.0).to_string();
        assert!(text.starts_with("score=100.0"));
    }
}
