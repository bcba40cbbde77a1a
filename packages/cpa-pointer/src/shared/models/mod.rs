//! Shared models
//!
//! Program representation consumed by the analyses: C types, expressions and
//! the CFA edges built from them.

pub mod c_expression;
pub mod c_types;
pub mod cfa;
mod file_location;

pub use c_expression::{BinaryOperator, CExpression, CFunctionCallExpression, UnaryOperator};
pub use c_types::{CBasicType, CType, CompositeKind, CompositeMember};
pub use cfa::{
    CDeclaration, CFunctionDeclaration, CInitializer, CParameterDeclaration, CStatement, CVariableDeclaration,
    CfaEdge, CfaEdgeKind, CfaNodeId,
};
pub use file_location::FileLocation;
