//! Strong and weak updates
//!
//! Decides how an assignment `lhs = rhs` changes the state once both sides are
//! resolved to location sets:
//!
//! | lhs                              | update                                  |
//! |----------------------------------|-----------------------------------------|
//! | Bot                              | unreachable (`BOTTOM_STATE`)            |
//! | Top                              | none (target unknown)                   |
//! | one plain or per-field location  | strong: replace                         |
//! | one union / merged struct        | union with stored value (set if absent) |
//! | several locations, or summarized | weak: union into every candidate        |
//!
//! Single targets go through the null/invalid/Top edge cases first.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::points_to::domain::{LocationSet, PointerAnalysisState, PointerLocation, BOTTOM_STATE};
use crate::shared::models::{CompositeKind, FileLocation};

use super::assignment_edge_cases::handle_assignment_edge_cases;

/// Update kind (for statistics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateKind {
    /// Exact replace of a single location
    Strong,
    /// Union into one or more locations
    Weak,
    /// Entries dropped because the value is unknown
    Forget,
    /// Path became infeasible
    Infeasible,
    /// Nothing changed (unknown target)
    Unchanged,
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpdateKind::Strong => "strong",
            UpdateKind::Weak => "weak",
            UpdateKind::Forget => "forget",
            UpdateKind::Infeasible => "infeasible",
            UpdateKind::Unchanged => "unchanged",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentOutcome {
    pub state: PointerAnalysisState,
    pub update: UpdateKind,
}

impl AssignmentOutcome {
    fn new(state: PointerAnalysisState, update: UpdateKind) -> Self {
        Self { state, update }
    }
}

/// How a single target location is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetKind {
    /// Declared variable (or one of its cells)
    Plain,
    /// One field of a struct instance
    StructField,
    /// Merged struct instance or union: several members share it
    Merged(CompositeKind),
}

impl TargetKind {
    fn of(location: &PointerLocation) -> Self {
        match location {
            PointerLocation::Struct { kind, .. } if location.is_merged_aggregate() => TargetKind::Merged(*kind),
            PointerLocation::Struct { .. } => TargetKind::StructField,
            _ => TargetKind::Plain,
        }
    }
}

/// Apply `lhs_locations = rhs`
///
/// `summarized` marks a single lhs location that stands for several runtime
/// cells (collapsed array elements); it is updated weakly.
pub fn handle_assignment(
    state: &PointerAnalysisState,
    lhs_locations: &LocationSet,
    rhs: &LocationSet,
    summarized: bool,
    location: &FileLocation,
) -> AssignmentOutcome {
    if state.is_bottom() {
        return AssignmentOutcome::new(BOTTOM_STATE, UpdateKind::Infeasible);
    }

    match lhs_locations {
        LocationSet::Bot => AssignmentOutcome::new(BOTTOM_STATE, UpdateKind::Infeasible),
        LocationSet::Top => AssignmentOutcome::new(state.clone(), UpdateKind::Unchanged),
        LocationSet::Explicit(_) => match lhs_locations.single_location() {
            Some(target) if !summarized => strong_update(state, target, rhs, location),
            _ => weak_update(state, lhs_locations, rhs, location),
        },
    }
}

fn strong_update(
    state: &PointerAnalysisState,
    target: &PointerLocation,
    rhs: &LocationSet,
    location: &FileLocation,
) -> AssignmentOutcome {
    if let Some(next) = handle_assignment_edge_cases(state, target, rhs, location) {
        let update = if next.is_bottom() {
            UpdateKind::Infeasible
        } else {
            UpdateKind::Forget
        };
        return AssignmentOutcome::new(next, update);
    }

    match TargetKind::of(target) {
        TargetKind::Merged(kind) => {
            let stored = state.points_to_map().and_then(|map| map.get(target));
            match stored {
                Some(previous) if !previous.is_top() => {
                    tracing::debug!(target = %target, kind = kind.as_str(), "Merged aggregate accumulates value");
                    let joined = previous.with_pointer_targets(rhs);
                    AssignmentOutcome::new(state.with_points_to(target.clone(), joined), UpdateKind::Weak)
                }
                _ => AssignmentOutcome::new(state.with_points_to(target.clone(), rhs.clone()), UpdateKind::Strong),
            }
        }
        TargetKind::StructField | TargetKind::Plain => {
            AssignmentOutcome::new(state.with_points_to(target.clone(), rhs.clone()), UpdateKind::Strong)
        }
    }
}

fn weak_update(
    state: &PointerAnalysisState,
    candidates: &LocationSet,
    rhs: &LocationSet,
    location: &FileLocation,
) -> AssignmentOutcome {
    let writable: Vec<&PointerLocation> = candidates.iter().filter(|c| !c.is_null_or_invalid()).collect();
    if writable.is_empty() {
        tracing::warn!(
            file = %location.file_name,
            line = location.start_line,
            targets = %candidates,
            "Every assignment target is null or invalid, path is infeasible"
        );
        return AssignmentOutcome::new(BOTTOM_STATE, UpdateKind::Infeasible);
    }

    if rhs.is_top() {
        let next = writable.iter().fold(state.clone(), |acc, target| acc.without(target));
        return AssignmentOutcome::new(next, UpdateKind::Forget);
    }

    let mut next = state.clone();
    for target in writable {
        // absent reads as Top, and Top ∪ rhs stays Top
        let Some(previous) = state.points_to_map().and_then(|map| map.get(target)) else {
            continue;
        };
        let joined = previous.with_pointer_targets(rhs);
        tracing::debug!(target = %target, value = %joined, "Weak update");
        next = next.with_points_to(target.clone(), joined);
    }
    AssignmentOutcome::new(next, UpdateKind::Weak)
}
