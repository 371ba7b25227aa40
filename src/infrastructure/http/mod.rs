//! # HTTP Infrastructure
//!
//! Shared HTTP client and error mapping for upstream adapters.

pub mod client;
pub mod error;

pub use client::{BROWSER_USER_AGENT, HttpClient, browser_headers};
pub use error::{UpstreamError, UpstreamResult};
