//! C expression IR
//!
//! Closed expression vocabulary handed over by the C frontend. Every variant
//! carries its (frontend-computed) type so the pointer analysis never has to
//! re-type an expression.
//!
//! Function calls are not expressions: they only appear inside call statements
//! ([`CFunctionCallExpression`]), the same way the CFA builder emits them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::c_types::CType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Multiply,
    Divide,
    Modulo,
    Plus,
    Minus,
    ShiftLeft,
    ShiftRight,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    BinaryAnd,
    BinaryXor,
    BinaryOr,
    Equals,
    NotEquals,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::BinaryAnd => "&",
            BinaryOperator::BinaryXor => "^",
            BinaryOperator::BinaryOr => "|",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
        }
    }
}

/// Unary operators other than address-of (which is its own expression kind)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOperator {
    Minus,
    Tilde,
    Not,
    Sizeof,
    Alignof,
}

impl UnaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Minus => "-",
            UnaryOperator::Tilde => "~",
            UnaryOperator::Not => "!",
            UnaryOperator::Sizeof => "sizeof ",
            UnaryOperator::Alignof => "_Alignof ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CExpression {
    /// Variable or function name; `qualified_name` is `function::name` for
    /// locals and the plain name for globals
    IdExpression {
        name: String,
        qualified_name: String,
        ty: CType,
    },
    /// `*operand`
    PointerExpression {
        operand: Box<CExpression>,
        ty: CType,
    },
    /// `array[subscript]`
    ArraySubscript {
        array: Box<CExpression>,
        subscript: Box<CExpression>,
        ty: CType,
    },
    /// `owner.field` or, with `is_pointer_dereference`, `owner->field`
    FieldReference {
        owner: Box<CExpression>,
        field_name: String,
        is_pointer_dereference: bool,
        ty: CType,
    },
    /// `&operand`
    AddressOf {
        operand: Box<CExpression>,
        ty: CType,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<CExpression>,
        ty: CType,
    },
    Binary {
        operator: BinaryOperator,
        lhs: Box<CExpression>,
        rhs: Box<CExpression>,
        ty: CType,
    },
    Cast {
        operand: Box<CExpression>,
        ty: CType,
    },
    /// `__real__`/`__imag__` projection of a complex value
    ComplexCast {
        operand: Box<CExpression>,
        ty: CType,
        is_real_cast: bool,
    },
    IntegerLiteral {
        value: i128,
        ty: CType,
    },
    FloatLiteral {
        value: f64,
        ty: CType,
    },
    CharLiteral {
        value: char,
        ty: CType,
    },
    StringLiteral {
        content: String,
        ty: CType,
    },
    /// GNU `&&label`
    AddressOfLabel {
        label: String,
        ty: CType,
    },
    /// `sizeof(T)` / `_Alignof(T)`
    TypeIdExpression {
        operator: UnaryOperator,
        type_id: CType,
        ty: CType,
    },
}

impl CExpression {
    pub fn ty(&self) -> &CType {
        match self {
            CExpression::IdExpression { ty, .. }
            | CExpression::PointerExpression { ty, .. }
            | CExpression::ArraySubscript { ty, .. }
            | CExpression::FieldReference { ty, .. }
            | CExpression::AddressOf { ty, .. }
            | CExpression::Unary { ty, .. }
            | CExpression::Binary { ty, .. }
            | CExpression::Cast { ty, .. }
            | CExpression::ComplexCast { ty, .. }
            | CExpression::IntegerLiteral { ty, .. }
            | CExpression::FloatLiteral { ty, .. }
            | CExpression::CharLiteral { ty, .. }
            | CExpression::StringLiteral { ty, .. }
            | CExpression::AddressOfLabel { ty, .. }
            | CExpression::TypeIdExpression { ty, .. } => ty,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Constructors (types derived from operands)
    // ═══════════════════════════════════════════════════════════════════════

    pub fn id(name: impl Into<String>, qualified_name: impl Into<String>, ty: CType) -> Self {
        CExpression::IdExpression {
            name: name.into(),
            qualified_name: qualified_name.into(),
            ty,
        }
    }

    /// `*operand`; the type is the operand's pointee (void if unknown)
    pub fn deref(operand: CExpression) -> Self {
        let ty = operand.ty().pointee().cloned().unwrap_or(CType::Void);
        CExpression::PointerExpression {
            operand: Box::new(operand),
            ty,
        }
    }

    pub fn address_of(operand: CExpression) -> Self {
        let ty = CType::pointer_to(operand.ty().clone());
        CExpression::AddressOf {
            operand: Box::new(operand),
            ty,
        }
    }

    pub fn subscript(array: CExpression, index: i128) -> Self {
        let ty = array.ty().pointee().cloned().unwrap_or(CType::Void);
        CExpression::ArraySubscript {
            array: Box::new(array),
            subscript: Box::new(CExpression::int_literal(index)),
            ty,
        }
    }

    /// `owner.field`
    pub fn field(owner: CExpression, field_name: impl Into<String>) -> Self {
        let field_name = field_name.into();
        let ty = owner
            .ty()
            .member(&field_name)
            .map(|m| m.ty.clone())
            .unwrap_or(CType::Void);
        CExpression::FieldReference {
            owner: Box::new(owner),
            field_name,
            is_pointer_dereference: false,
            ty,
        }
    }

    /// `owner->field`
    pub fn arrow(owner: CExpression, field_name: impl Into<String>) -> Self {
        let field_name = field_name.into();
        let ty = owner
            .ty()
            .pointee()
            .and_then(|target| target.member(&field_name))
            .map(|m| m.ty.clone())
            .unwrap_or(CType::Void);
        CExpression::FieldReference {
            owner: Box::new(owner),
            field_name,
            is_pointer_dereference: true,
            ty,
        }
    }

    pub fn cast(operand: CExpression, ty: CType) -> Self {
        CExpression::Cast {
            operand: Box::new(operand),
            ty,
        }
    }

    pub fn binary(operator: BinaryOperator, lhs: CExpression, rhs: CExpression, ty: CType) -> Self {
        CExpression::Binary {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            ty,
        }
    }

    pub fn int_literal(value: i128) -> Self {
        CExpression::IntegerLiteral {
            value,
            ty: CType::int(),
        }
    }

    pub fn string_literal(content: impl Into<String>) -> Self {
        let content = content.into();
        let length = content.chars().count() as u64 + 1;
        CExpression::StringLiteral {
            content,
            ty: CType::array_of(CType::char(), Some(length)),
        }
    }

    /// `(T*) 0`
    pub fn null_pointer(pointee: CType) -> Self {
        CExpression::cast(CExpression::int_literal(0), CType::pointer_to(pointee))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Shape queries
    // ═══════════════════════════════════════════════════════════════════════

    /// Constant integer value of a literal, a negated literal, or an integer
    /// cast of either
    pub fn as_integer_literal(&self) -> Option<i128> {
        match self {
            CExpression::IntegerLiteral { value, .. } => Some(*value),
            CExpression::Unary {
                operator: UnaryOperator::Minus,
                operand,
                ..
            } => operand.as_integer_literal().and_then(i128::checked_neg),
            CExpression::Cast { operand, ty } if !ty.is_pointer() => operand.as_integer_literal(),
            _ => None,
        }
    }

    /// `0` under any chain of (complex) casts
    pub fn is_zero_literal(&self) -> bool {
        match self {
            CExpression::IntegerLiteral { value, .. } => *value == 0,
            CExpression::Cast { operand, .. } | CExpression::ComplexCast { operand, .. } => {
                operand.is_zero_literal()
            }
            _ => false,
        }
    }
}

impl fmt::Display for CExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CExpression::IdExpression { name, .. } => write!(f, "{}", name),
            CExpression::PointerExpression { operand, .. } => write!(f, "*{}", operand),
            CExpression::ArraySubscript {
                array, subscript, ..
            } => write!(f, "{}[{}]", array, subscript),
            CExpression::FieldReference {
                owner,
                field_name,
                is_pointer_dereference,
                ..
            } => {
                let op = if *is_pointer_dereference { "->" } else { "." };
                write!(f, "{}{}{}", owner, op, field_name)
            }
            CExpression::AddressOf { operand, .. } => write!(f, "&{}", operand),
            CExpression::Unary {
                operator, operand, ..
            } => write!(f, "{}{}", operator.as_str(), operand),
            CExpression::Binary {
                operator, lhs, rhs, ..
            } => write!(f, "({} {} {})", lhs, operator.as_str(), rhs),
            CExpression::Cast { operand, ty } => write!(f, "({}) {}", ty, operand),
            CExpression::ComplexCast {
                operand,
                is_real_cast,
                ..
            } => {
                let op = if *is_real_cast { "__real__" } else { "__imag__" };
                write!(f, "{} {}", op, operand)
            }
            CExpression::IntegerLiteral { value, .. } => write!(f, "{}", value),
            CExpression::FloatLiteral { value, .. } => write!(f, "{}", value),
            CExpression::CharLiteral { value, .. } => write!(f, "{:?}", value),
            CExpression::StringLiteral { content, .. } => write!(f, "{:?}", content),
            CExpression::AddressOfLabel { label, .. } => write!(f, "&&{}", label),
            CExpression::TypeIdExpression {
                operator, type_id, ..
            } => write!(f, "{}({})", operator.as_str().trim_end(), type_id),
        }
    }
}

/// Function call as it appears on the right of a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CFunctionCallExpression {
    /// Callee designator: a function name, or any expression of function-pointer type
    pub function_name: CExpression,
    pub arguments: Vec<CExpression>,
    /// Return type of the call
    pub ty: CType,
}

impl CFunctionCallExpression {
    pub fn new(function_name: CExpression, arguments: Vec<CExpression>, ty: CType) -> Self {
        Self {
            function_name,
            arguments,
            ty,
        }
    }

    /// Name of the called function when the callee is statically known
    pub fn callee_name(&self) -> Option<&str> {
        match &self.function_name {
            CExpression::IdExpression { name, ty, .. } if ty.is_function() => Some(name),
            CExpression::AddressOf { operand, .. } => match operand.as_ref() {
                CExpression::IdExpression { name, ty, .. } if ty.is_function() => Some(name),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for CFunctionCallExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.arguments.iter().map(|a| a.to_string()).collect();
        write!(f, "{}({})", self.function_name, args.join(", "))
    }
}
