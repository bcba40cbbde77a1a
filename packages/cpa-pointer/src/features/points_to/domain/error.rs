//! Pointer analysis error types
//!
//! Imprecision is never an error (it becomes Top or Bot) and crash paths
//! become the unreachable state. What remains are constructs the domain
//! cannot model and broken edge contracts.

use thiserror::Error;

use crate::shared::models::{CfaEdge, FileLocation};

#[derive(Debug, Error)]
pub enum PointerAnalysisError {
    /// Syntax the domain has no model for (e.g. GNU `&&label`)
    #[error("Unsupported expression '{expression}': {reason}")]
    UnsupportedExpression { expression: String, reason: String },

    /// Pointer added to pointer
    #[error("Malformed pointer arithmetic '{expression}': both operands are pointers")]
    MalformedPointerArithmetic { expression: String },

    /// Call edge whose argument list does not fit the callee
    #[error("Function '{function}' expects {expected} argument(s) but is called with {actual}")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// Path longer than the configured replay limit
    #[error("Path of {length} edges exceeds the limit of {limit}")]
    PathTooLong { length: usize, limit: usize },

    /// Failure while handling one CFA edge
    #[error("{location}: cannot analyze edge '{edge}'")]
    UnsupportedEdge {
        edge: String,
        location: FileLocation,
        #[source]
        source: Box<PointerAnalysisError>,
    },
}

/// Result type for pointer analysis operations
pub type PointerResult<T> = Result<T, PointerAnalysisError>;

impl PointerAnalysisError {
    pub fn unsupported(expression: impl ToString, reason: impl Into<String>) -> Self {
        Self::UnsupportedExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach the edge being analyzed; already attached errors pass through
    pub fn on_edge(self, edge: &CfaEdge) -> Self {
        match self {
            err @ PointerAnalysisError::UnsupportedEdge { .. } => err,
            err => PointerAnalysisError::UnsupportedEdge {
                edge: edge.code(),
                location: edge.location.clone(),
                source: Box::new(err),
            },
        }
    }

    /// The failure beneath any edge context
    pub fn root_cause(&self) -> &PointerAnalysisError {
        match self {
            PointerAnalysisError::UnsupportedEdge { source, .. } => source.root_cause(),
            err => err,
        }
    }
}
