//! # Application Layer
//!
//! Use-case orchestration on top of the domain.
//!
//! - [`services`] - Aggregation, ranking and the analysis pipeline
//! - [`error`] - Run-level failures

pub mod error;
pub mod services;

pub use error::{AnalysisError, AnalysisResult};
