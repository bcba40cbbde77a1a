//! Domain models for Points-to Analysis
//!
//! Core abstractions independent of how edges are interpreted:
//! - PointerLocation: addressable entities (variables, fields, null, invalid)
//! - LocationSet: Top / Bot / explicit set lattice
//! - PointerAnalysisState: persistent points-to map or the unreachable state

pub mod error;
pub mod location_set;
pub mod pointer_location;
pub mod points_to_state;

pub use error::{PointerAnalysisError, PointerResult};
pub use location_set::LocationSet;
pub use pointer_location::{InvalidReason, PointerLocation};
pub use points_to_state::{PointerAnalysisState, PointsToMap, BOTTOM_STATE};
