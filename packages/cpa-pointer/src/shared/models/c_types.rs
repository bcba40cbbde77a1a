//! C type model
//!
//! The subset of the C type system the pointer analysis needs to tell
//! pointer-carrying values apart from scalars:
//! - pointers and arrays (arrays decay to a pointer to element 0)
//! - structs and unions with their member lists (field sensitivity)
//! - function types (return type of calls, variadic parameter lists)
//!
//! Typedefs are kept as written and stripped with [`CType::canonical`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Arithmetic and character types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CBasicType {
    Bool,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl CBasicType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CBasicType::Bool => "_Bool",
            CBasicType::Char => "char",
            CBasicType::Int => "int",
            CBasicType::Long => "long",
            CBasicType::Float => "float",
            CBasicType::Double => "double",
        }
    }

    pub fn is_integer(&self) -> bool {
        !matches!(self, CBasicType::Float | CBasicType::Double)
    }
}

/// Struct or union
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKind {
    Struct,
    Union,
}

impl CompositeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositeKind::Struct => "struct",
            CompositeKind::Union => "union",
        }
    }
}

/// Named member of a struct or union
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositeMember {
    pub name: String,
    pub ty: CType,
}

impl CompositeMember {
    pub fn new(name: impl Into<String>, ty: CType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CType {
    Void,
    Basic(CBasicType),
    Pointer(Box<CType>),
    Array {
        element: Box<CType>,
        length: Option<u64>,
    },
    /// Complete struct/union definition
    Composite {
        kind: CompositeKind,
        name: String,
        members: Vec<CompositeMember>,
    },
    /// Reference to a struct/union by tag (`struct node *next` inside `struct node`)
    Elaborated { kind: CompositeKind, name: String },
    Function {
        return_type: Box<CType>,
        parameters: Vec<CType>,
        variadic: bool,
    },
    Typedef { name: String, target: Box<CType> },
}

impl CType {
    pub fn int() -> Self {
        CType::Basic(CBasicType::Int)
    }

    pub fn char() -> Self {
        CType::Basic(CBasicType::Char)
    }

    pub fn float() -> Self {
        CType::Basic(CBasicType::Float)
    }

    pub fn pointer_to(target: CType) -> Self {
        CType::Pointer(Box::new(target))
    }

    pub fn array_of(element: CType, length: Option<u64>) -> Self {
        CType::Array {
            element: Box::new(element),
            length,
        }
    }

    pub fn struct_type(name: impl Into<String>, members: Vec<CompositeMember>) -> Self {
        CType::Composite {
            kind: CompositeKind::Struct,
            name: name.into(),
            members,
        }
    }

    pub fn union_type(name: impl Into<String>, members: Vec<CompositeMember>) -> Self {
        CType::Composite {
            kind: CompositeKind::Union,
            name: name.into(),
            members,
        }
    }

    pub fn function(return_type: CType, parameters: Vec<CType>, variadic: bool) -> Self {
        CType::Function {
            return_type: Box::new(return_type),
            parameters,
            variadic,
        }
    }

    /// Strip typedefs
    pub fn canonical(&self) -> &CType {
        let mut ty = self;
        while let CType::Typedef { target, .. } = ty {
            ty = target;
        }
        ty
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.canonical(), CType::Pointer(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.canonical(), CType::Array { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self.canonical(), CType::Function { .. })
    }

    /// Operand types that take part in pointer arithmetic
    pub fn is_pointer_or_array(&self) -> bool {
        matches!(self.canonical(), CType::Pointer(_) | CType::Array { .. })
    }

    /// Values of these types evaluate to an address rather than to stored contents
    pub fn decays_to_pointer(&self) -> bool {
        matches!(self.canonical(), CType::Array { .. } | CType::Function { .. })
    }

    /// Target of a pointer or element of an array
    pub fn pointee(&self) -> Option<&CType> {
        match self.canonical() {
            CType::Pointer(target) => Some(target),
            CType::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn composite_kind(&self) -> Option<CompositeKind> {
        match self.canonical() {
            CType::Composite { kind, .. } | CType::Elaborated { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Tag name of a struct/union type
    pub fn composite_name(&self) -> Option<&str> {
        match self.canonical() {
            CType::Composite { name, .. } | CType::Elaborated { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Members of a complete struct/union, empty for anything else
    pub fn members(&self) -> &[CompositeMember] {
        match self.canonical() {
            CType::Composite { members, .. } => members,
            _ => &[],
        }
    }

    pub fn member(&self, name: &str) -> Option<&CompositeMember> {
        self.members().iter().find(|m| m.name == name)
    }

    /// Return type of a function or function pointer type
    pub fn return_type(&self) -> Option<&CType> {
        match self.canonical() {
            CType::Function { return_type, .. } => Some(return_type),
            CType::Pointer(target) => match target.canonical() {
                CType::Function { return_type, .. } => Some(return_type),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self.canonical(), CType::Function { variadic: true, .. })
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::Void => write!(f, "void"),
            CType::Basic(basic) => write!(f, "{}", basic.as_str()),
            CType::Pointer(target) => write!(f, "{}*", target),
            CType::Array { element, length } => match length {
                Some(n) => write!(f, "{}[{}]", element, n),
                None => write!(f, "{}[]", element),
            },
            CType::Composite { kind, name, .. } | CType::Elaborated { kind, name } => {
                write!(f, "{} {}", kind.as_str(), name)
            }
            CType::Function {
                return_type,
                parameters,
                variadic,
            } => {
                let mut params: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();
                if *variadic {
                    params.push("...".to_string());
                }
                write!(f, "{} (*)({})", return_type, params.join(", "))
            }
            CType::Typedef { name, .. } => write!(f, "{}", name),
        }
    }
}
