/*
 * Assignment edge cases shared by every single-target write
 */

use crate::features::points_to::domain::{LocationSet, PointerAnalysisState, PointerLocation, BOTTOM_STATE};
use crate::shared::models::FileLocation;

/// Writes that do not go through the regular strong/weak update
///
/// - target is `NULL` or invalid: the program crashes here, the path is
///   infeasible from this point on
/// - value is Top: the target's entry is dropped (absent reads as Top)
///
/// Returns `None` when the assignment needs regular handling.
pub fn handle_assignment_edge_cases(
    state: &PointerAnalysisState,
    lhs: &PointerLocation,
    rhs: &LocationSet,
    location: &FileLocation,
) -> Option<PointerAnalysisState> {
    match lhs {
        PointerLocation::Null => {
            tracing::warn!(
                file = %location.file_name,
                line = location.start_line,
                "Assignment through a null pointer, path is infeasible"
            );
            Some(BOTTOM_STATE)
        }
        PointerLocation::Invalid(reason) => {
            tracing::warn!(
                file = %location.file_name,
                line = location.start_line,
                reason = %reason,
                "Assignment through an invalid pointer, path is infeasible"
            );
            Some(BOTTOM_STATE)
        }
        _ if rhs.is_top() => Some(state.without(lhs)),
        _ => None,
    }
}
