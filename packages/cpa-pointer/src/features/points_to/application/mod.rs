//! Application layer for Points-to Analysis
//!
//! - **PointerTransferRelation**: successor state of one CFA edge
//! - **PointerAnalyzer**: replays a program path, keeps every state
//! - **PointsToView**: `PointsToQuery` over one state

pub mod path_analyzer;
pub mod transfer_relation;

pub use path_analyzer::{PathAnalysisResult, PathAnalysisStats, PointerAnalyzer, PointsToView};
pub use transfer_relation::{PointerTransferRelation, Transition};
