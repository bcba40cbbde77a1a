//! # Flow-Sensitive Points-to Analysis
//!
//! Explicit points-to sets per program point for C programs, computed edge by
//! edge over a control-flow automaton (CFA):
//! - **Locations**: declared variables (with element offset), struct fields or
//!   merged struct/union instances, the null pointer, invalid pointers
//! - **Sets**: Top (anything) / Bot (nothing) / explicit, with join
//! - **State**: persistent map location → set; absent entries read as Top;
//!   one shared `BOTTOM_STATE` marks infeasible paths
//! - **Updates**: strong for a single exact target, weak for several targets,
//!   collapsed array cells and unions
//!
//! ## Usage
//! ```text
//! use cpa_pointer::features::points_to::{PointerAnalyzer, PointsToQuery};
//!
//! let analyzer = PointerAnalyzer::from_config(PointerAnalysisConfig::default());
//! let result = analyzer.analyze_path(&edges)?;
//!
//! let view = analyzer.view(&result.final_state);
//! assert!(view.may_alias(&p, &q)?);
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-exports for public API
pub use application::{
    PathAnalysisResult, PathAnalysisStats, PointerAnalyzer, PointerTransferRelation, PointsToView, Transition,
};
pub use domain::{
    InvalidReason, LocationSet, PointerAnalysisError, PointerAnalysisState, PointerLocation, PointerResult,
    PointsToMap, BOTTOM_STATE,
};
pub use infrastructure::{DeclaredOffsetOperator, ResolveMode, UpdateKind};
pub use ports::{OffsetOperator, PointsToQuery};
