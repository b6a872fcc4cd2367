//! Error types for change-set value construction.

use thiserror::Error;

/// Errors returned while constructing change-set values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChangeSetError {
    /// The path is empty after trimming and separator stripping.
    #[error("file path must not be empty")]
    EmptyPath,

    /// The path contains whitespace or control characters.
    #[error("file path '{0}' contains whitespace")]
    WhitespaceInPath(String),

    /// The path contains a `..` segment.
    #[error("file path '{0}' escapes the repository root")]
    ParentTraversal(String),

    /// The action value is unsupported.
    #[error("unknown file action: {0}")]
    UnknownAction(String),
}
