//! Pointer Locations
//!
//! The closed set of addressable entities the analysis reasons about:
//! - DeclaredVariable: a program variable (or a cell of it, by offset);
//!   array variables are flagged so a collapsed cell is known as such wherever
//!   a pointer to it ends up
//! - Struct: a field of one aggregate instance, or the whole instance when
//!   fields are merged
//! - Null: the null pointer
//! - Invalid: a bogus address produced by a modeled error
//!
//! Locations are plain values. The derived total order (variant first, then
//! fields) is what makes every iteration over sets and maps deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::shared::models::CompositeKind;

/// Prefix of synthetic string-literal locations; `"` cannot occur in a C identifier
const STRING_LITERAL_PREFIX: &str = "__string_literal__::\"";

/// Suffix of synthetic return-value locations
const RETURN_VALUE_SUFFIX: &str = "::__retval__";

/// Why a location is invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvalidReason {
    /// Dereferenced a pointer that can only be null
    NullDereference,
    /// Result of pointer arithmetic outside the supported shapes
    PointerArithmetic,
}

impl InvalidReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidReason::NullDereference => "NULL_DEREFERENCE",
            InvalidReason::PointerArithmetic => "POINTER_ARITHMETIC",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PointerLocation {
    DeclaredVariable {
        qualified_name: Arc<str>,
        offset: i64,
        #[serde(default, skip_serializing_if = "is_false")]
        array: bool,
    },
    /// `field == None` is the merged location standing for every field of the instance
    Struct {
        kind: CompositeKind,
        aggregate: Arc<str>,
        instance: Arc<str>,
        field: Option<Arc<str>>,
        /// Per-field location of an array-typed member
        #[serde(default, skip_serializing_if = "is_false")]
        array: bool,
    },
    Null,
    Invalid(InvalidReason),
}

impl PointerLocation {
    /// Cell 0 of a declared variable
    #[inline]
    pub fn variable(qualified_name: impl AsRef<str>) -> Self {
        Self::variable_at(qualified_name, 0)
    }

    #[inline]
    pub fn variable_at(qualified_name: impl AsRef<str>, offset: i64) -> Self {
        PointerLocation::DeclaredVariable {
            qualified_name: Arc::from(qualified_name.as_ref()),
            offset,
            array: false,
        }
    }

    /// Cell `offset` of an array variable
    pub fn array_element(qualified_name: impl AsRef<str>, offset: i64) -> Self {
        Self::variable_at(qualified_name, offset).into_array_storage()
    }

    /// Synthetic storage of a string literal, keyed by its content
    pub fn string_literal(content: &str) -> Self {
        Self::variable(format!("{}{}\"", STRING_LITERAL_PREFIX, content))
    }

    /// Synthetic location holding the value returned by `function`
    pub fn return_value(function: &str) -> Self {
        Self::variable(Self::return_value_name(function))
    }

    /// Qualified name of the return-value variable of `function`
    pub fn return_value_name(function: &str) -> String {
        format!("{}{}", function, RETURN_VALUE_SUFFIX)
    }

    /// One independent location per field
    pub fn struct_field(kind: CompositeKind, aggregate: &str, instance: &str, field: &str) -> Self {
        PointerLocation::Struct {
            kind,
            aggregate: Arc::from(aggregate),
            instance: Arc::from(instance),
            field: Some(Arc::from(field)),
            array: false,
        }
    }

    /// One location for the whole aggregate instance
    pub fn merged_struct(kind: CompositeKind, aggregate: &str, instance: &str) -> Self {
        PointerLocation::Struct {
            kind,
            aggregate: Arc::from(aggregate),
            instance: Arc::from(instance),
            field: None,
            array: false,
        }
    }

    /// Marks storage of an array-typed object
    ///
    /// Merged aggregates are left alone: every member of the instance shares
    /// them, so their identity cannot depend on one member's type.
    pub fn into_array_storage(self) -> Self {
        match self {
            PointerLocation::DeclaredVariable {
                qualified_name, offset, ..
            } => PointerLocation::DeclaredVariable {
                qualified_name,
                offset,
                array: true,
            },
            PointerLocation::Struct {
                kind,
                aggregate,
                instance,
                field: Some(field),
                ..
            } if kind == CompositeKind::Struct => PointerLocation::Struct {
                kind,
                aggregate,
                instance,
                field: Some(field),
                array: true,
            },
            other => other,
        }
    }

    /// Whether this location is array storage
    pub fn is_array_storage(&self) -> bool {
        matches!(
            self,
            PointerLocation::DeclaredVariable { array: true, .. } | PointerLocation::Struct { array: true, .. }
        )
    }

    /// Variable whose storage holds this location, without field or index path
    pub fn storage_root(&self) -> Option<&str> {
        match self {
            PointerLocation::DeclaredVariable { qualified_name, .. } => Some(&**qualified_name),
            PointerLocation::Struct { instance, .. } => {
                let instance: &str = instance;
                let end = instance.find(|c: char| c == '.' || c == '[').unwrap_or(instance.len());
                Some(&instance[..end])
            }
            PointerLocation::Null | PointerLocation::Invalid(_) => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, PointerLocation::Null)
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        matches!(self, PointerLocation::Invalid(_))
    }

    /// Writing through these locations crashes the program
    #[inline]
    pub fn is_null_or_invalid(&self) -> bool {
        self.is_null() || self.is_invalid()
    }

    /// Whether several fields (or union members) share this location
    pub fn is_merged_aggregate(&self) -> bool {
        matches!(
            self,
            PointerLocation::Struct { kind: CompositeKind::Union, .. } | PointerLocation::Struct { field: None, .. }
        )
    }

    /// Whether this location is (part of) the storage of variable `qualified_name`
    pub fn is_rooted_at(&self, qualified_name: &str) -> bool {
        let instance = match self {
            PointerLocation::DeclaredVariable { qualified_name: name, .. } => return name.as_ref() == qualified_name,
            PointerLocation::Struct { instance, .. } => instance,
            PointerLocation::Null | PointerLocation::Invalid(_) => return false,
        };
        match instance.strip_prefix(qualified_name) {
            Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('['),
            None => false,
        }
    }

    /// Name identifying the aggregate instance stored at this location
    ///
    /// Used as the owner of field locations, so `s.f`, `(&s)->f` and
    /// `p->f` with `p → {s}` all name the same field.
    pub fn instance_identity(&self) -> Option<Arc<str>> {
        match self {
            PointerLocation::DeclaredVariable {
                qualified_name, offset, ..
            } => {
                if *offset == 0 {
                    Some(qualified_name.clone())
                } else {
                    Some(Arc::from(format!("{}[{}]", qualified_name, offset)))
                }
            }
            PointerLocation::Struct {
                instance, field, ..
            } => match field {
                Some(field) => Some(Arc::from(format!("{}.{}", instance, field))),
                None => Some(instance.clone()),
            },
            PointerLocation::Null | PointerLocation::Invalid(_) => None,
        }
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl fmt::Display for PointerLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerLocation::DeclaredVariable {
                qualified_name, offset, ..
            } => {
                if *offset == 0 {
                    write!(f, "{}", qualified_name)
                } else {
                    write!(f, "{}[{}]", qualified_name, offset)
                }
            }
            PointerLocation::Struct {
                kind,
                aggregate,
                instance,
                field,
                ..
            } => match field {
                Some(field) => write!(f, "({} {}) {}.{}", kind.as_str(), aggregate, instance, field),
                None => write!(f, "({} {}) {}", kind.as_str(), aggregate, instance),
            },
            PointerLocation::Null => write!(f, "NULL"),
            PointerLocation::Invalid(reason) => write!(f, "INVALID({})", reason),
        }
    }
}
