//! # In-Memory Eligibility Provider
//!
//! Fixed symbol set for tests and offline runs.

use crate::domain::value_objects::symbol::Symbol;
use crate::infrastructure::eligibility::traits::EligibilityProvider;
use async_trait::async_trait;
use std::collections::HashSet;

/// Returns the same symbol set on every call.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEligibilityProvider {
    symbols: HashSet<Symbol>,
}

impl InMemoryEligibilityProvider {
    /// Creates a provider from raw tickers. Blank tickers are dropped.
    #[must_use]
    pub fn new<'a>(symbols: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            symbols: symbols.into_iter().filter_map(Symbol::parse).collect(),
        }
    }

    /// Creates a provider with no symbols (upstream unavailable).
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EligibilityProvider for InMemoryEligibilityProvider {
    async fn eligible_symbols(&self) -> HashSet<Symbol> {
        self.symbols.clone()
    }

    fn name(&self) -> &'static str {
        "InMemory"
    }
}
