//! # Domain Layer
//!
//! Scanner rows, merged candidates and the pure scoring rules applied to
//! them. Nothing in this layer performs I/O.

pub mod entities;
pub mod services;
pub mod value_objects;
