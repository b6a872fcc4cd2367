//! Repository, content, and pull request models returned by hosts.

use super::{BranchName, ObjectSha, PullRequestNumber, RepositoryFullName};
use crate::change_set::domain::FilePath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Repository metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    /// Repository identifier.
    pub full_name: RepositoryFullName,
    /// Branch new work is based on when none is configured.
    pub default_branch: BranchName,
    /// Whether the repository is private.
    pub private: bool,
    /// Optional repository description.
    pub description: Option<String>,
}

/// Kind of a directory-listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
    /// Symbolic link.
    Symlink,
    /// Submodule pointer.
    Submodule,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Entry name without its parent directory.
    pub name: String,
    /// Repository-relative path.
    pub path: String,
    /// Entry kind.
    pub kind: ContentKind,
}

/// A file read from a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Repository-relative path.
    pub path: FilePath,
    /// Current blob identifier, required to update the file.
    pub sha: ObjectSha,
    /// Decoded UTF-8 content.
    pub content: String,
}

/// A single-file create or update on a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    /// Repository-relative path.
    pub path: FilePath,
    /// New file content.
    pub content: String,
    /// Commit message.
    pub message: String,
    /// Branch receiving the commit.
    pub branch: BranchName,
    /// Blob identifier of the file being replaced, if it exists.
    pub previous: Option<ObjectSha>,
}

/// A pull request to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPullRequest {
    /// Title.
    pub title: String,
    /// Markdown body.
    pub body: String,
    /// Branch with the proposed changes.
    pub head: BranchName,
    /// Branch the changes target.
    pub base: BranchName,
}

/// A pull request as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePullRequest {
    /// Host-assigned number.
    pub number: PullRequestNumber,
    /// Browser URL.
    pub url: String,
}

/// Strategy used to merge a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Combine every commit into one.
    #[default]
    Squash,
    /// Create a merge commit.
    Merge,
    /// Replay commits onto the base.
    Rebase,
}

impl MergeMethod {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Squash => "squash",
            Self::Merge => "merge",
            Self::Rebase => "rebase",
        }
    }
}

impl fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a merge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// Whether the host merged the pull request.
    pub merged: bool,
    /// Resulting commit on the base branch, when merged.
    pub sha: Option<ObjectSha>,
    /// Host-provided message.
    pub message: String,
}

/// How a pull request changes a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// The file is new.
    Added,
    /// The file content changed.
    Modified,
    /// The file was deleted.
    Removed,
    /// The file moved.
    Renamed,
    /// Any other host-specific status.
    #[serde(other)]
    Changed,
}

/// One file changed by a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestFile {
    /// Repository-relative path.
    pub filename: String,
    /// Change kind.
    pub status: FileStatus,
    /// Lines added.
    pub additions: u64,
    /// Lines deleted.
    pub deletions: u64,
}
