//! # Eligibility Provider Trait
//!
//! Port definition for the list of symbols that can be traded.

use crate::domain::value_objects::symbol::Symbol;
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;

/// Trait for eligibility sources.
///
/// Implementations never fail: when the list cannot be loaded they log
/// the cause and return an empty set, which the caller treats as the
/// upstream being unavailable.
#[async_trait]
pub trait EligibilityProvider: Send + Sync + fmt::Debug {
    /// Returns the current set of eligible symbols.
    async fn eligible_symbols(&self) -> HashSet<Symbol>;

    /// Returns the name of this provider.
    fn name(&self) -> &'static str;
}
