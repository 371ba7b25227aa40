//! # Domain Services
//!
//! Stateless scoring logic that does not belong to a single entity.
//!
//! ## Services
//!
//! - [`numeric`]: Parse policies for untrusted numeric columns
//! - [`scoring`]: Factor normalization and the weighted composite score
//! - [`hint`]: Directional hint from price change and relative volume

pub mod hint;
pub mod numeric;
pub mod scoring;

pub use hint::{hint_for, strategy_hint};
pub use numeric::{LenientParse, NumericParseError, NumericParsePolicy, StrictParse};
pub use scoring::{
    CompositeScorer, PriceBands, ScoreBreakdown, ScoreWeights, ScoringConfig,
    ScoringConfigError, VolumeSaturation,
};
