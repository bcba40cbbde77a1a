//! Expression Resolver
//!
//! Maps a C expression to the location set it denotes in a given state.
//!
//! Two modes:
//! - `Address`: the cells the expression designates (`x` → `{x}`,
//!   `*p` → targets of `p`). Used for assignment targets.
//! - `PointsTo`: the locations the expression's value points to
//!   (`p` → targets of `p`, `&x` → `{x}`). Used for right-hand sides.
//!
//! Array- and function-typed values decay: their value is their own address.
//!
//! The resolver never changes the state. Shapes it cannot follow become Top
//! (or Bot for values that are not pointers at all); only syntax the domain has
//! no model for is an error.

use crate::config::{PointerAnalysisConfig, StructHandlingStrategy};
use crate::features::points_to::domain::{
    InvalidReason, LocationSet, PointerAnalysisError, PointerAnalysisState, PointerLocation, PointerResult,
};
use crate::features::points_to::ports::OffsetOperator;
use crate::shared::models::{BinaryOperator, CExpression, CFunctionCallExpression, CType, CompositeKind};

use super::offset::DeclaredOffsetOperator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveMode {
    /// Cells designated by an lvalue
    Address,
    /// Targets of the expression's pointer value
    PointsTo,
}

/// Resolve with the offset model selected by `config`
pub fn resolve_expression(
    expression: &CExpression,
    state: &PointerAnalysisState,
    mode: ResolveMode,
    config: &PointerAnalysisConfig,
) -> PointerResult<LocationSet> {
    let offsets = DeclaredOffsetOperator::from_config(config);
    resolve_expression_with(expression, state, mode, config, &offsets)
}

pub fn resolve_expression_with(
    expression: &CExpression,
    state: &PointerAnalysisState,
    mode: ResolveMode,
    config: &PointerAnalysisConfig,
    offsets: &dyn OffsetOperator,
) -> PointerResult<LocationSet> {
    Resolver {
        state,
        config,
        offsets,
    }
    .resolve(expression, mode)
}

/// Value returned by a call, read from the callee's return-value location
pub fn resolve_call_result(call: &CFunctionCallExpression, state: &PointerAnalysisState) -> LocationSet {
    if !call.ty.is_pointer() {
        return LocationSet::Bot;
    }
    match call.callee_name() {
        Some(name) => state.points_to_set(&PointerLocation::return_value(name)),
        None => LocationSet::Top,
    }
}

/// Whether the cell written by `lhs` may stand for several runtime cells
///
/// With offsets collapsed, every element of an array shares one location, so
/// writes into array storage, or reached through indexing or pointer
/// arithmetic, must not overwrite it. `targets` are the cells `lhs` resolved to.
pub fn is_summarized_write(lhs: &CExpression, targets: &LocationSet, config: &PointerAnalysisConfig) -> bool {
    !config.offset_sensitive && (targets.iter().any(PointerLocation::is_array_storage) || reaches_collapsed_cell(lhs))
}

fn reaches_collapsed_cell(lhs: &CExpression) -> bool {
    match lhs {
        CExpression::ArraySubscript { .. } => true,
        CExpression::PointerExpression { operand, .. } => is_offset_pointer(operand),
        CExpression::FieldReference {
            owner,
            is_pointer_dereference,
            ..
        } => {
            if *is_pointer_dereference {
                is_offset_pointer(owner)
            } else {
                reaches_collapsed_cell(owner)
            }
        }
        CExpression::Cast { operand, .. } => reaches_collapsed_cell(operand),
        _ => false,
    }
}

/// Pointer value computed by arithmetic, or an array decaying to element 0
fn is_offset_pointer(expression: &CExpression) -> bool {
    match expression {
        CExpression::Binary {
            operator: BinaryOperator::Plus | BinaryOperator::Minus,
            lhs,
            rhs,
            ..
        } => lhs.ty().is_pointer_or_array() || rhs.ty().is_pointer_or_array(),
        CExpression::Cast { operand, .. } => is_offset_pointer(operand),
        other => other.ty().is_array(),
    }
}

struct Resolver<'a> {
    state: &'a PointerAnalysisState,
    config: &'a PointerAnalysisConfig,
    offsets: &'a dyn OffsetOperator,
}

impl Resolver<'_> {
    fn resolve(&self, expression: &CExpression, mode: ResolveMode) -> PointerResult<LocationSet> {
        let result = self.resolve_inner(expression, mode)?;
        tracing::trace!(expression = %expression, ?mode, result = %result, "resolved");
        Ok(result)
    }

    fn resolve_inner(&self, expression: &CExpression, mode: ResolveMode) -> PointerResult<LocationSet> {
        match expression {
            CExpression::IdExpression {
                qualified_name, ty, ..
            } => {
                let mut variable = PointerLocation::variable(qualified_name);
                if ty.is_array() {
                    variable = variable.into_array_storage();
                }
                Ok(self.value_or_address(LocationSet::singleton(variable), ty, mode))
            }

            CExpression::PointerExpression { operand, ty } => {
                let cells = self.resolve(operand, ResolveMode::PointsTo)?;
                Ok(self.value_or_address(cells, ty, mode))
            }

            CExpression::ArraySubscript {
                array, subscript, ty, ..
            } => {
                let index = match subscript.as_integer_literal().and_then(|v| i64::try_from(v).ok()) {
                    Some(index) => index,
                    None => return Ok(LocationSet::Top),
                };
                let base = self.resolve(array, ResolveMode::PointsTo)?;
                let cells = self.offsets.shift(&base, index);
                Ok(self.value_or_address(cells, ty, mode))
            }

            CExpression::FieldReference {
                owner,
                field_name,
                is_pointer_dereference,
                ty,
            } => {
                let mut cells = self.resolve_field(owner, field_name, *is_pointer_dereference)?;
                if ty.is_array() && cells.is_explicit() {
                    cells = cells.iter().cloned().map(PointerLocation::into_array_storage).collect();
                }
                Ok(self.value_or_address(cells, ty, mode))
            }

            CExpression::AddressOf { operand, .. } => {
                let cells = self.resolve(operand, ResolveMode::Address)?;
                Ok(if cells.is_explicit() { cells } else { LocationSet::Top })
            }

            CExpression::Cast { operand, .. } | CExpression::ComplexCast { operand, .. } => {
                if operand.is_zero_literal() {
                    Ok(LocationSet::singleton(PointerLocation::Null))
                } else {
                    self.resolve(operand, mode)
                }
            }

            CExpression::Binary {
                operator, lhs, rhs, ..
            } => self.resolve_binary(expression, *operator, lhs, rhs),

            CExpression::StringLiteral { content, .. } => {
                Ok(LocationSet::singleton(PointerLocation::string_literal(content)))
            }

            CExpression::AddressOfLabel { .. } => Err(PointerAnalysisError::unsupported(
                expression,
                "address of label",
            )),

            CExpression::Unary { .. }
            | CExpression::IntegerLiteral { .. }
            | CExpression::FloatLiteral { .. }
            | CExpression::CharLiteral { .. }
            | CExpression::TypeIdExpression { .. } => Ok(LocationSet::Bot),
        }
    }

    /// `cells` are where a value of type `ty` is stored
    fn value_or_address(&self, cells: LocationSet, ty: &CType, mode: ResolveMode) -> LocationSet {
        match mode {
            ResolveMode::Address => cells,
            ResolveMode::PointsTo if ty.decays_to_pointer() => cells,
            ResolveMode::PointsTo => self.state.dereference(&cells),
        }
    }

    /// Cells of `owner.field` / `owner->field`
    fn resolve_field(&self, owner: &CExpression, field_name: &str, through_pointer: bool) -> PointerResult<LocationSet> {
        let (owner_cells, aggregate_type) = if through_pointer {
            (self.resolve(owner, ResolveMode::PointsTo)?, owner.ty().pointee())
        } else {
            (self.resolve(owner, ResolveMode::Address)?, Some(owner.ty()))
        };

        if owner_cells.contains_all_nulls() {
            return Ok(LocationSet::singleton(PointerLocation::Invalid(
                InvalidReason::NullDereference,
            )));
        }

        let (instance, in_array) = match owner_cells.single_location() {
            Some(location @ PointerLocation::Invalid(_)) => return Ok(LocationSet::singleton(location.clone())),
            Some(location) => match location.instance_identity() {
                Some(instance) => (instance, location.is_array_storage()),
                None => return Ok(LocationSet::Top),
            },
            None => return Ok(LocationSet::Top),
        };

        let (kind, aggregate) = match aggregate_type.and_then(|ty| Some((ty.composite_kind()?, ty.composite_name()?))) {
            Some(found) => found,
            None => return Ok(LocationSet::Top),
        };

        let location = match (kind, self.config.struct_strategy) {
            (CompositeKind::Union, _) | (CompositeKind::Struct, StructHandlingStrategy::JustStruct) => {
                PointerLocation::merged_struct(kind, aggregate, &instance)
            }
            (CompositeKind::Struct, StructHandlingStrategy::AllFields) => {
                PointerLocation::struct_field(kind, aggregate, &instance, field_name)
            }
        };
        // a field of an array element is stored once per element
        let location = if in_array { location.into_array_storage() } else { location };
        Ok(LocationSet::singleton(location))
    }

    fn resolve_binary(
        &self,
        expression: &CExpression,
        operator: BinaryOperator,
        lhs: &CExpression,
        rhs: &CExpression,
    ) -> PointerResult<LocationSet> {
        let lhs_is_pointer = lhs.ty().is_pointer_or_array();
        let rhs_is_pointer = rhs.ty().is_pointer_or_array();
        let invalid = LocationSet::singleton(PointerLocation::Invalid(InvalidReason::PointerArithmetic));

        match (lhs_is_pointer, rhs_is_pointer, operator) {
            (false, false, _) => Ok(LocationSet::Bot),
            (true, true, BinaryOperator::Plus) => Err(PointerAnalysisError::MalformedPointerArithmetic {
                expression: expression.to_string(),
            }),
            (true, false, BinaryOperator::Plus) => self.shift_by_literal(lhs, rhs, false),
            (false, true, BinaryOperator::Plus) => self.shift_by_literal(rhs, lhs, false),
            (true, false, BinaryOperator::Minus) => self.shift_by_literal(lhs, rhs, true),
            _ => Ok(invalid),
        }
    }

    /// `pointer ± literal`; a non-literal offset lands anywhere (Top)
    fn shift_by_literal(&self, pointer: &CExpression, offset: &CExpression, negate: bool) -> PointerResult<LocationSet> {
        let literal = offset
            .as_integer_literal()
            .and_then(|v| if negate { v.checked_neg() } else { Some(v) })
            .and_then(|v| i64::try_from(v).ok());
        let Some(delta) = literal else {
            return Ok(LocationSet::Top);
        };
        let base = self.resolve(pointer, ResolveMode::PointsTo)?;
        Ok(self.offsets.shift(&base, delta))
    }
}
