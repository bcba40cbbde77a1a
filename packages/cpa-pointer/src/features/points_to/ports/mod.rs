//! Ports (Interfaces) for Points-to Analysis
//!
//! - `OffsetOperator`: how pointer arithmetic moves locations; the resolver
//!   only sees this trait, so offset models can be swapped per configuration
//! - `PointsToQuery`: read access to an analysis result for other analyses

use crate::features::points_to::domain::{LocationSet, PointerResult};
use crate::shared::models::CExpression;

/// Shifts every location of a set by a signed element offset
///
/// # Example
/// ```ignore
/// let shifted = operator.shift(&LocationSet::singleton(PointerLocation::variable("a")), 2);
/// ```
pub trait OffsetOperator: Send + Sync {
    fn shift(&self, set: &LocationSet, offset: i64) -> LocationSet;
}

/// Read-only queries against one analysis state
pub trait PointsToQuery {
    /// Locations the value of a pointer expression may reference
    fn points_to(&self, expression: &CExpression) -> PointerResult<LocationSet>;

    /// Cells the (lvalue) expression designates
    fn locations_of(&self, expression: &CExpression) -> PointerResult<LocationSet>;

    /// Whether two pointer expressions may reference a common location
    fn may_alias(&self, a: &CExpression, b: &CExpression) -> PointerResult<bool> {
        Ok(self.points_to(a)?.may_overlap(&self.points_to(b)?))
    }
}
