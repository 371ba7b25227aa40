//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! - [`Symbol`]: Trimmed, upper-cased ticker used as the aggregation key
//! - [`DirectionalHint`]: Bullish / Bearish / Neutral bias

pub mod hint;
pub mod symbol;

pub use hint::DirectionalHint;
pub use symbol::{BlankSymbolError, Symbol};
