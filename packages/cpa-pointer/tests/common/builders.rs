//! Test data builders
//!
//! `Scope` names variables the way the CFA does (`function::name`),
//! `PathBuilder` chains edges with consecutive node ids.

use cpa_pointer::features::points_to::{LocationSet, PointerLocation};
use cpa_pointer::shared::models::{
    CDeclaration, CExpression, CFunctionCallExpression, CFunctionDeclaration, CInitializer, CParameterDeclaration,
    CStatement, CType, CVariableDeclaration, CfaEdge, CfaEdgeKind, CfaNodeId, CompositeMember, FileLocation,
};

pub fn int_ptr() -> CType {
    CType::pointer_to(CType::int())
}

pub fn char_ptr() -> CType {
    CType::pointer_to(CType::char())
}

/// struct pair { int *first; int *second; }
pub fn pair_type() -> CType {
    CType::struct_type(
        "pair",
        vec![
            CompositeMember::new("first", int_ptr()),
            CompositeMember::new("second", int_ptr()),
        ],
    )
}

/// Variables of one function
#[derive(Debug, Clone)]
pub struct Scope {
    function: String,
}

impl Scope {
    pub fn new(function: &str) -> Self {
        Self {
            function: function.to_string(),
        }
    }

    pub fn qualified(&self, name: &str) -> String {
        format!("{}::{}", self.function, name)
    }

    pub fn var(&self, name: &str, ty: CType) -> CExpression {
        CExpression::id(name, self.qualified(name), ty)
    }

    pub fn int(&self, name: &str) -> CExpression {
        self.var(name, CType::int())
    }

    /// `&name` for an int variable
    pub fn addr(&self, name: &str) -> CExpression {
        CExpression::address_of(self.int(name))
    }

    pub fn loc(&self, name: &str) -> PointerLocation {
        PointerLocation::variable(self.qualified(name))
    }

    /// Cell `offset` of array `name`
    pub fn element(&self, name: &str, offset: i64) -> PointerLocation {
        PointerLocation::array_element(self.qualified(name), offset)
    }

    pub fn set(&self, names: &[&str]) -> LocationSet {
        names.iter().map(|n| self.loc(n)).collect()
    }

    pub fn parameter(&self, name: &str, ty: CType) -> CParameterDeclaration {
        CParameterDeclaration::new(name, self.qualified(name), ty)
    }

    pub fn declaration(&self, name: &str, ty: CType, initializer: Option<CInitializer>) -> CVariableDeclaration {
        CVariableDeclaration {
            name: name.to_string(),
            qualified_name: self.qualified(name),
            ty,
            is_global: false,
            initializer,
        }
    }
}

/// Builder for a linear CFA path
#[derive(Debug)]
pub struct PathBuilder {
    edges: Vec<CfaEdge>,
    next_node: CfaNodeId,
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PathBuilder {
    pub fn new() -> Self {
        Self {
            edges: Vec::new(),
            next_node: 1,
        }
    }

    fn push(mut self, kind: CfaEdgeKind) -> Self {
        let from = self.next_node;
        let location = FileLocation::new("scenario.c", from, 1);
        self.edges.push(CfaEdge::new(from, from + 1, kind, location));
        self.next_node += 1;
        self
    }

    pub fn declare(self, declaration: CVariableDeclaration) -> Self {
        self.push(CfaEdgeKind::Declaration(CDeclaration::Variable(declaration)))
    }

    pub fn assign(self, lhs: CExpression, rhs: CExpression) -> Self {
        self.push(CfaEdgeKind::Statement(CStatement::ExpressionAssignment { lhs, rhs }))
    }

    pub fn call_assign(self, lhs: CExpression, call: CFunctionCallExpression) -> Self {
        self.push(CfaEdgeKind::Statement(CStatement::FunctionCallAssignment { lhs, call }))
    }

    pub fn assume(self, expression: CExpression, truth_assumption: bool) -> Self {
        self.push(CfaEdgeKind::Assume {
            expression,
            truth_assumption,
        })
    }

    pub fn enter(self, call: CFunctionCallExpression, callee: CFunctionDeclaration) -> Self {
        self.push(CfaEdgeKind::FunctionCall { call, callee })
    }

    pub fn ret(self, function_name: &str, expression: Option<CExpression>, return_type: CType) -> Self {
        self.push(CfaEdgeKind::ReturnStatement {
            function_name: function_name.to_string(),
            expression,
            return_type,
        })
    }

    pub fn exit(self, function_name: &str, call_statement: CStatement) -> Self {
        self.push(CfaEdgeKind::FunctionReturn {
            function_name: function_name.to_string(),
            call_statement,
        })
    }

    pub fn build(self) -> Vec<CfaEdge> {
        self.edges
    }
}

/// Declaration of a function `name(parameters...)` returning `return_type`
pub fn function(name: &str, return_type: CType, parameters: Vec<CParameterDeclaration>) -> CFunctionDeclaration {
    let types = parameters.iter().map(|p| p.ty.clone()).collect();
    CFunctionDeclaration {
        name: name.to_string(),
        ty: CType::function(return_type, types, false),
        parameters,
    }
}

/// Direct call `name(arguments...)`
pub fn call(declaration: &CFunctionDeclaration, arguments: Vec<CExpression>) -> CFunctionCallExpression {
    let callee = CExpression::id(&declaration.name, &declaration.name, declaration.ty.clone());
    let return_type = declaration.return_type().clone();
    CFunctionCallExpression::new(callee, arguments, return_type)
}
