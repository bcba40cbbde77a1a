/*
 * CPA Pointer - Flow-Sensitive Points-to Analysis for C
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : CFA model (types, expressions, edges, source locations)
 * - features/    : points_to (domain → ports → infrastructure → application)
 * - config/      : Presets, builder overrides, versioned YAML
 *
 * States are persistent maps: successors share structure with their
 * predecessors, so every intermediate state of a path can be kept.
 */

// Crate-level lint configuration
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models (C types, expressions, CFA edges)
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{PointerAnalysisConfig, Preset, StructHandlingStrategy};
pub use errors::{CpaError, Result};
pub use features::points_to::{
    LocationSet, PathAnalysisResult, PathAnalysisStats, PointerAnalysisError, PointerAnalysisState,
    PointerAnalyzer, PointerLocation, PointerTransferRelation, PointsToQuery, PointsToView, BOTTOM_STATE,
};
