//! Common test utilities for cpa-pointer
//!
//! Builders for CFA paths and the C expressions they carry.

#![allow(dead_code)]

mod builders;

// Re-export all utilities
pub use builders::*;
