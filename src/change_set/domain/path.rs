//! Normalized repository-relative file paths.

use super::ChangeSetError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Repository-relative file path.
///
/// Paths are trimmed and stripped of leading `/` separators. Empty paths,
/// paths containing whitespace, and paths with a `..` segment are rejected.
///
/// # Examples
///
///     use devpilot::change_set::domain::FilePath;
///
///     let path = FilePath::new("  /src/app.py ").expect("valid path");
///     assert_eq!(path.as_str(), "src/app.py");
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilePath(String);

impl FilePath {
    /// Creates a normalized file path.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeSetError`] when the normalized value is empty,
    /// contains whitespace, or traverses above the repository root.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ChangeSetError> {
        let raw = value.as_ref();
        let normalized = raw.trim().trim_start_matches('/');

        if normalized.is_empty() {
            return Err(ChangeSetError::EmptyPath);
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(ChangeSetError::WhitespaceInPath(raw.to_owned()));
        }
        if normalized.split('/').any(|segment| segment == "..") {
            return Err(ChangeSetError::ParentTraversal(raw.to_owned()));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the final path segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }
}

impl AsRef<str> for FilePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for FilePath {
    type Error = ChangeSetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FilePath> for String {
    fn from(value: FilePath) -> Self {
        value.0
    }
}
