//! File edits and the ordered change set produced for one task run.

use super::{ChangeSetError, FilePath};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Kind of edit applied to a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    /// The file is written with the full content.
    #[default]
    Create,
    /// The file replaces existing content.
    Modify,
    /// The file is removed.
    Delete,
}

impl FileAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Delete => "delete",
        }
    }
}

impl TryFrom<&str> for FileAction {
    type Error = ChangeSetError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "modify" => Ok(Self::Modify),
            "delete" => Ok(Self::Delete),
            _ => Err(ChangeSetError::UnknownAction(value.to_owned())),
        }
    }
}

/// A single proposed file edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    path: FilePath,
    content: String,
    #[serde(default)]
    action: FileAction,
}

impl FileChange {
    /// Creates a file change with the default `create` action.
    ///
    /// Surrounding whitespace is trimmed from the content.
    #[must_use]
    pub fn new(path: FilePath, content: impl AsRef<str>) -> Self {
        Self {
            path,
            content: content.as_ref().trim().to_owned(),
            action: FileAction::Create,
        }
    }

    /// Overrides the edit action.
    #[must_use]
    pub const fn with_action(mut self, action: FileAction) -> Self {
        self.action = action;
        self
    }

    /// Returns the target path.
    #[must_use]
    pub const fn path(&self) -> &FilePath {
        &self.path
    }

    /// Returns the full file content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the edit action.
    #[must_use]
    pub const fn action(&self) -> FileAction {
        self.action
    }

    /// Returns the content size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.content.len()
    }
}

/// Ordered set of file edits, unique by path.
///
/// The first change recorded for a path wins; later changes for the same
/// path are discarded.
///
/// # Examples
///
///     use devpilot::change_set::domain::{ChangeSet, FileChange, FilePath};
///
///     let mut changes = ChangeSet::new();
///     let path = FilePath::new("a.py").expect("valid path");
///     assert!(changes.push(FileChange::new(path.clone(), "print(1)")));
///     assert!(!changes.push(FileChange::new(path, "print(2)")));
///     assert_eq!(changes.len(), 1);
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    changes: Vec<FileChange>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    /// Appends a change unless its path is already present.
    ///
    /// Returns `true` when the change was recorded.
    pub fn push(&mut self, change: FileChange) -> bool {
        if self.contains(change.path()) {
            return false;
        }
        self.changes.push(change);
        true
    }

    /// Returns whether a change for the path exists.
    #[must_use]
    pub fn contains(&self, path: &FilePath) -> bool {
        self.changes.iter().any(|change| change.path() == path)
    }

    /// Returns the change recorded for a path.
    #[must_use]
    pub fn get(&self, path: &FilePath) -> Option<&FileChange> {
        self.changes.iter().find(|change| change.path() == path)
    }

    /// Returns the number of changes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns whether the change set holds no changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Iterates over the changes in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, FileChange> {
        self.changes.iter()
    }

    /// Returns the paths in insertion order.
    #[must_use]
    pub fn paths(&self) -> Vec<&FilePath> {
        self.changes.iter().map(FileChange::path).collect()
    }

    /// Returns the changes as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[FileChange] {
        &self.changes
    }
}

impl FromIterator<FileChange> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = FileChange>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let changes = iter
            .into_iter()
            .filter(|change| seen.insert(change.path().clone()))
            .collect();
        Self { changes }
    }
}

impl IntoIterator for ChangeSet {
    type Item = FileChange;
    type IntoIter = std::vec::IntoIter<FileChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a FileChange;
    type IntoIter = std::slice::Iter<'a, FileChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
