//! # Eligibility
//!
//! Sources of the tradeable symbol set.
//!
//! - [`traits`] - The [`EligibilityProvider`] port
//! - [`nse`] - NSE F&O market-lot list with a file cache
//! - [`in_memory`] - Fixed set for tests
//! - [`error`] - Load failures

pub mod error;
pub mod in_memory;
pub mod nse;
pub mod traits;

pub use error::{EligibilityError, EligibilityResult};
pub use in_memory::InMemoryEligibilityProvider;
pub use nse::{NseFoConfig, NseFoListProvider};
pub use traits::EligibilityProvider;
