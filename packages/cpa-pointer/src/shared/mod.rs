//! Shared module - Common types
//!
//! Types used by every feature. The C frontend that produces them lives
//! outside this crate.

pub mod models;

pub use models::*;
