/*
 * Offset operator for pointer arithmetic on location sets
 */

use crate::config::PointerAnalysisConfig;
use crate::features::points_to::domain::{InvalidReason, LocationSet, PointerLocation};
use crate::features::points_to::ports::OffsetOperator;

/// Moves declared-variable cells by element offsets
///
/// | location          | sensitive          | insensitive |
/// |-------------------|--------------------|-------------|
/// | `v[k]`            | `v[k+n]`           | `v[k]`      |
/// | struct field      | Top                | unchanged   |
/// | `NULL`            | `INVALID(ARITH)`   | same        |
/// | `INVALID(_)`      | unchanged          | unchanged   |
///
/// A zero offset is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredOffsetOperator {
    offset_sensitive: bool,
}

impl DeclaredOffsetOperator {
    pub fn new(offset_sensitive: bool) -> Self {
        Self { offset_sensitive }
    }

    pub fn from_config(config: &PointerAnalysisConfig) -> Self {
        Self::new(config.offset_sensitive)
    }

    /// `None` means the result is unknown (Top)
    fn shift_location(&self, location: &PointerLocation, offset: i64) -> Option<PointerLocation> {
        match location {
            PointerLocation::DeclaredVariable {
                qualified_name,
                offset: base,
                array,
            } => {
                if !self.offset_sensitive {
                    return Some(location.clone());
                }
                base.checked_add(offset).map(|shifted| PointerLocation::DeclaredVariable {
                    qualified_name: qualified_name.clone(),
                    offset: shifted,
                    array: *array,
                })
            }
            PointerLocation::Struct { .. } => {
                if self.offset_sensitive {
                    None
                } else {
                    Some(location.clone())
                }
            }
            PointerLocation::Null => Some(PointerLocation::Invalid(InvalidReason::PointerArithmetic)),
            PointerLocation::Invalid(_) => Some(location.clone()),
        }
    }
}

impl OffsetOperator for DeclaredOffsetOperator {
    fn shift(&self, set: &LocationSet, offset: i64) -> LocationSet {
        let members = match set {
            LocationSet::Explicit(members) if offset != 0 => members,
            _ => return set.clone(),
        };
        let mut shifted = Vec::with_capacity(members.len());
        for location in members.iter() {
            match self.shift_location(location, offset) {
                Some(moved) => shifted.push(moved),
                None => return LocationSet::Top,
            }
        }
        LocationSet::explicit(shifted)
    }
}
