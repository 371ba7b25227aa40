//! # API Layer
//!
//! External interfaces of the scanner.

pub mod rest;
