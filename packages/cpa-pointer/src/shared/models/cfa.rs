//! Control-flow automaton edges
//!
//! A CFA is a graph of program locations (nodes) connected by edges that each
//! carry exactly one operation: a declaration, a statement, an assumption, or
//! one of the interprocedural edges around a call. The pointer transfer
//! relation consumes one edge at a time.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::c_expression::{CExpression, CFunctionCallExpression};
use super::c_types::CType;
use super::file_location::FileLocation;

/// Node number inside a CFA
pub type CfaNodeId = u32;

/// Initializer of a variable declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CInitializer {
    Expression(CExpression),
    /// `{ a, b, ... }`, positional (array elements or struct members in order)
    List(Vec<CInitializer>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CVariableDeclaration {
    pub name: String,
    pub qualified_name: String,
    pub ty: CType,
    pub is_global: bool,
    pub initializer: Option<CInitializer>,
}

impl CVariableDeclaration {
    /// The declared variable as an expression
    pub fn as_expression(&self) -> CExpression {
        CExpression::id(&self.name, &self.qualified_name, self.ty.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CParameterDeclaration {
    pub name: String,
    pub qualified_name: String,
    pub ty: CType,
}

impl CParameterDeclaration {
    pub fn new(name: impl Into<String>, qualified_name: impl Into<String>, ty: CType) -> Self {
        Self {
            name: name.into(),
            qualified_name: qualified_name.into(),
            ty,
        }
    }

    pub fn as_expression(&self) -> CExpression {
        CExpression::id(&self.name, &self.qualified_name, self.ty.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CFunctionDeclaration {
    pub name: String,
    /// Always a [`CType::Function`]
    pub ty: CType,
    pub parameters: Vec<CParameterDeclaration>,
}

impl CFunctionDeclaration {
    pub fn is_variadic(&self) -> bool {
        self.ty.is_variadic()
    }

    pub fn return_type(&self) -> &CType {
        self.ty.return_type().unwrap_or(&CType::Void)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CDeclaration {
    Variable(CVariableDeclaration),
    Function(CFunctionDeclaration),
    /// `typedef`, `struct tag { ... };` and friends
    Type { name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CStatement {
    /// `lhs = rhs;`
    ExpressionAssignment { lhs: CExpression, rhs: CExpression },
    /// `lhs = f(...);`
    FunctionCallAssignment {
        lhs: CExpression,
        call: CFunctionCallExpression,
    },
    /// `expr;`
    ExpressionStatement(CExpression),
    /// `f(...);`
    FunctionCallStatement(CFunctionCallExpression),
}

impl CStatement {
    pub fn function_call(&self) -> Option<&CFunctionCallExpression> {
        match self {
            CStatement::FunctionCallAssignment { call, .. } | CStatement::FunctionCallStatement(call) => {
                Some(call)
            }
            _ => None,
        }
    }
}

impl fmt::Display for CStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CStatement::ExpressionAssignment { lhs, rhs } => write!(f, "{} = {};", lhs, rhs),
            CStatement::FunctionCallAssignment { lhs, call } => write!(f, "{} = {};", lhs, call),
            CStatement::ExpressionStatement(expr) => write!(f, "{};", expr),
            CStatement::FunctionCallStatement(call) => write!(f, "{};", call),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CfaEdgeKind {
    Blank,
    Declaration(CDeclaration),
    Statement(CStatement),
    /// Branch taken when `expression` evaluates to `truth_assumption`
    Assume {
        expression: CExpression,
        truth_assumption: bool,
    },
    /// Caller → callee entry; binds arguments to parameters
    FunctionCall {
        call: CFunctionCallExpression,
        callee: CFunctionDeclaration,
    },
    /// `return expression;` inside `function_name`
    ReturnStatement {
        function_name: String,
        expression: Option<CExpression>,
        return_type: CType,
    },
    /// Callee exit → caller; `call_statement` is the statement that made the call
    FunctionReturn {
        function_name: String,
        call_statement: CStatement,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfaEdge {
    pub predecessor: CfaNodeId,
    pub successor: CfaNodeId,
    pub kind: CfaEdgeKind,
    pub location: FileLocation,
}

impl CfaEdge {
    pub fn new(predecessor: CfaNodeId, successor: CfaNodeId, kind: CfaEdgeKind, location: FileLocation) -> Self {
        Self {
            predecessor,
            successor,
            kind,
            location,
        }
    }

    /// Source-like rendering of the edge operation
    pub fn code(&self) -> String {
        match &self.kind {
            CfaEdgeKind::Blank => String::new(),
            CfaEdgeKind::Declaration(CDeclaration::Variable(decl)) => match &decl.initializer {
                Some(CInitializer::Expression(init)) => format!("{} {} = {};", decl.ty, decl.name, init),
                Some(CInitializer::List(_)) => format!("{} {} = {{...}};", decl.ty, decl.name),
                None => format!("{} {};", decl.ty, decl.name),
            },
            CfaEdgeKind::Declaration(CDeclaration::Function(decl)) => format!("{} {}(...);", decl.return_type(), decl.name),
            CfaEdgeKind::Declaration(CDeclaration::Type { name }) => format!("typedef {};", name),
            CfaEdgeKind::Statement(statement) => statement.to_string(),
            CfaEdgeKind::Assume {
                expression,
                truth_assumption,
            } => {
                if *truth_assumption {
                    format!("[{}]", expression)
                } else {
                    format!("[!({})]", expression)
                }
            }
            CfaEdgeKind::FunctionCall { call, .. } => call.to_string(),
            CfaEdgeKind::ReturnStatement { expression, .. } => match expression {
                Some(expr) => format!("return {};", expr),
                None => "return;".to_string(),
            },
            CfaEdgeKind::FunctionReturn { function_name, .. } => format!("Return Edge from {}", function_name),
        }
    }
}

impl fmt::Display for CfaEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{} -{{{}}}-> N{}", self.predecessor, self.code(), self.successor)
    }
}
