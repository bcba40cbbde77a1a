//! Pointer-carrying cells of aggregates
//!
//! Struct copies, initializer lists and zero-initialization write many pointer
//! cells at once. These helpers flatten such writes into one `CellWrite` per
//! pointer-typed leaf, expressed as synthetic lvalues (`s.f`, `a[2].p`) so the
//! regular resolver computes their locations.
//!
//! With offsets collapsed every array element lands on the same location, so
//! only one element per array is enumerated there.

use crate::shared::models::{CExpression, CInitializer, CType, CompositeKind};

/// Elements enumerated per array when offsets are tracked
pub const MAX_EXPANDED_ELEMENTS: u64 = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Pointer value of this expression
    Expression(CExpression),
    /// Zero-initialized
    Null,
    /// Not known (e.g. returned by an external function)
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellWrite {
    pub target: CExpression,
    pub value: CellValue,
}

/// Whether a value of type `ty` holds pointers
pub fn carries_pointers(ty: &CType) -> bool {
    match ty.canonical() {
        CType::Pointer(_) => true,
        CType::Array { element, .. } => carries_pointers(element),
        CType::Composite { members, .. } => members.iter().any(|m| carries_pointers(&m.ty)),
        _ => false,
    }
}

/// Cells written by `T lvalue = init;` (missing parts are zero-initialized)
pub fn initializer_cells(
    lvalue: &CExpression,
    ty: &CType,
    init: Option<&CInitializer>,
    offset_sensitive: bool,
) -> Vec<CellWrite> {
    let mut out = Vec::new();
    collect_initializer(lvalue.clone(), ty, init, offset_sensitive, &mut out);
    out
}

/// Cells written by the aggregate assignment `dst = src`
///
/// Without a source every cell becomes unknown.
pub fn copy_cells(dst: &CExpression, src: Option<&CExpression>, ty: &CType, offset_sensitive: bool) -> Vec<CellWrite> {
    let mut out = Vec::new();
    collect_copy(dst.clone(), src.cloned(), ty, offset_sensitive, &mut out);
    out
}

fn collect_initializer(
    lvalue: CExpression,
    ty: &CType,
    init: Option<&CInitializer>,
    offset_sensitive: bool,
    out: &mut Vec<CellWrite>,
) {
    if !carries_pointers(ty) {
        return;
    }
    match ty.canonical() {
        CType::Pointer(_) => match init {
            None => out.push(CellWrite {
                target: lvalue,
                value: CellValue::Null,
            }),
            Some(CInitializer::Expression(expression)) => out.push(CellWrite {
                target: lvalue,
                value: CellValue::Expression(expression.clone()),
            }),
            // scalar in braces: `int *p = { &x };`
            Some(CInitializer::List(items)) => collect_initializer(lvalue, ty, items.first(), offset_sensitive, out),
        },

        CType::Array { element, length } => {
            let items: &[CInitializer] = match init {
                Some(CInitializer::List(items)) => items,
                // only string literals initialize arrays directly, and they hold no pointers
                Some(CInitializer::Expression(_)) => return,
                None => &[],
            };
            for (index, item) in items.iter().enumerate() {
                let cell = CExpression::subscript(lvalue.clone(), index as i128);
                collect_initializer(cell, element, Some(item), offset_sensitive, out);
            }
            for index in zeroed_indices(items.len() as u64, *length, offset_sensitive) {
                let cell = CExpression::subscript(lvalue.clone(), index as i128);
                collect_initializer(cell, element, None, offset_sensitive, out);
            }
        }

        CType::Composite { kind, members, .. } => match init {
            Some(CInitializer::Expression(source)) => collect_copy(lvalue, Some(source.clone()), ty, offset_sensitive, out),
            Some(CInitializer::List(items)) => {
                for (position, member) in initialized_members(*kind, members.len()).zip(members) {
                    let cell = CExpression::field(lvalue.clone(), &member.name);
                    collect_initializer(cell, &member.ty, items.get(position), offset_sensitive, out);
                }
            }
            None => {
                for (_, member) in initialized_members(*kind, members.len()).zip(members) {
                    let cell = CExpression::field(lvalue.clone(), &member.name);
                    collect_initializer(cell, &member.ty, None, offset_sensitive, out);
                }
            }
        },

        _ => {}
    }
}

fn collect_copy(
    dst: CExpression,
    src: Option<CExpression>,
    ty: &CType,
    offset_sensitive: bool,
    out: &mut Vec<CellWrite>,
) {
    if !carries_pointers(ty) {
        return;
    }
    match ty.canonical() {
        CType::Pointer(_) => out.push(CellWrite {
            target: dst,
            value: src.map_or(CellValue::Unknown, CellValue::Expression),
        }),
        CType::Array { element, length } => {
            for index in copied_indices(*length, offset_sensitive) {
                let cell = CExpression::subscript(dst.clone(), index as i128);
                let source = src.as_ref().map(|s| CExpression::subscript(s.clone(), index as i128));
                collect_copy(cell, source, element, offset_sensitive, out);
            }
        }
        CType::Composite { members, .. } => {
            for member in members {
                let cell = CExpression::field(dst.clone(), &member.name);
                let source = src.as_ref().map(|s| CExpression::field(s.clone(), &member.name));
                collect_copy(cell, source, &member.ty, offset_sensitive, out);
            }
        }
        _ => {}
    }
}

/// Only the first member of a union is initialized
fn initialized_members(kind: CompositeKind, count: usize) -> std::ops::Range<usize> {
    match kind {
        CompositeKind::Struct => 0..count,
        CompositeKind::Union => 0..count.min(1),
    }
}

/// Elements after the `initialized` ones that are implicitly zero
fn zeroed_indices(initialized: u64, length: Option<u64>, offset_sensitive: bool) -> std::ops::Range<u64> {
    let length = length.unwrap_or(0);
    if initialized >= length {
        return 0..0;
    }
    if offset_sensitive {
        initialized..length.min(initialized.saturating_add(MAX_EXPANDED_ELEMENTS))
    } else {
        initialized..initialized + 1
    }
}

fn copied_indices(length: Option<u64>, offset_sensitive: bool) -> std::ops::Range<u64> {
    match (length, offset_sensitive) {
        (Some(0), _) => 0..0,
        (_, false) => 0..1,
        (Some(n), true) => 0..n.min(MAX_EXPANDED_ELEMENTS),
        // TODO: flexible array members are not copied cell by cell; their old targets survive the copy
        (None, true) => 0..0,
    }
}
