//! Infrastructure layer for Points-to Analysis
//!
//! Building blocks of the transfer relation:
//! - **DeclaredOffsetOperator**: pointer arithmetic on location sets
//! - **Expression resolver**: expression → location set, in address or
//!   points-to mode
//! - **Assignment edge cases**: null/invalid targets, unknown values
//! - **Struct/union handler**: strong vs weak update per target
//! - **Pointer cells**: pointer-typed leaves of aggregate writes

pub mod assignment_edge_cases;
pub mod expression_resolver;
pub mod offset;
pub mod pointer_cells;
pub mod struct_union_handler;

pub use assignment_edge_cases::handle_assignment_edge_cases;
pub use expression_resolver::{
    is_summarized_write, resolve_call_result, resolve_expression, resolve_expression_with, ResolveMode,
};
pub use offset::DeclaredOffsetOperator;
pub use pointer_cells::{carries_pointers, copy_cells, initializer_cells, CellValue, CellWrite};
pub use struct_union_handler::{handle_assignment, AssignmentOutcome, UpdateKind};
