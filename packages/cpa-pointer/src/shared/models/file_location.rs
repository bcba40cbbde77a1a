//! Source location types
//!
//! Every CFA edge carries the position of the statement it was built from, so
//! diagnostics on pruned paths can point back at the offending line.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a statement in a source file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct FileLocation {
    pub file_name: String,
    pub start_line: u32,
    pub start_column: u32,
}

impl FileLocation {
    pub fn new(file_name: impl Into<String>, start_line: u32, start_column: u32) -> Self {
        Self {
            file_name: file_name.into(),
            start_line,
            start_column,
        }
    }

    /// Location used for synthetic edges that have no source counterpart
    pub fn dummy() -> Self {
        Self::new("<none>", 0, 0)
    }
}

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_name, self.start_line)
    }
}
