//! Git object models exchanged during commit construction.

use super::{BranchName, ObjectSha};
use crate::change_set::domain::FilePath;
use serde::{Deserialize, Serialize};

/// Regular non-executable file mode.
pub const REGULAR_FILE_MODE: &str = "100644";

/// A working branch created for one delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    name: BranchName,
    base_commit: ObjectSha,
    head_commit: Option<ObjectSha>,
}

impl Branch {
    /// Creates a branch pointing at its base commit.
    #[must_use]
    pub const fn new(name: BranchName, base_commit: ObjectSha) -> Self {
        Self {
            name,
            base_commit,
            head_commit: None,
        }
    }

    /// Records the commit the branch now points to.
    pub fn advance_to(&mut self, commit: ObjectSha) {
        self.head_commit = Some(commit);
    }

    /// Returns the branch name.
    #[must_use]
    pub const fn name(&self) -> &BranchName {
        &self.name
    }

    /// Returns the commit the branch was created from.
    #[must_use]
    pub const fn base_commit(&self) -> &ObjectSha {
        &self.base_commit
    }

    /// Returns the head commit once one has been pushed.
    #[must_use]
    pub const fn head_commit(&self) -> Option<&ObjectSha> {
        self.head_commit.as_ref()
    }
}

/// A file whose content was uploaded as a blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedBlob {
    /// Repository-relative file path.
    pub path: FilePath,
    /// Blob identifier returned by the host.
    pub sha: ObjectSha,
}

/// The evolving description of the commit under construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitPlan {
    base_tree: ObjectSha,
    blobs: Vec<UploadedBlob>,
    removals: Vec<FilePath>,
    new_tree: Option<ObjectSha>,
    new_commit: Option<ObjectSha>,
}

impl CommitPlan {
    /// Starts a plan on top of the base commit's tree.
    #[must_use]
    pub const fn new(base_tree: ObjectSha) -> Self {
        Self {
            base_tree,
            blobs: Vec::new(),
            removals: Vec::new(),
            new_tree: None,
            new_commit: None,
        }
    }

    /// Records a successfully uploaded blob.
    pub fn add_blob(&mut self, path: FilePath, sha: ObjectSha) {
        self.blobs.push(UploadedBlob { path, sha });
    }

    /// Records a path to remove from the base tree.
    pub fn remove(&mut self, path: FilePath) {
        self.removals.push(path);
    }

    /// Records the tree built from the plan.
    pub fn set_tree(&mut self, sha: ObjectSha) {
        self.new_tree = Some(sha);
    }

    /// Records the commit wrapping the new tree.
    pub fn set_commit(&mut self, sha: ObjectSha) {
        self.new_commit = Some(sha);
    }

    /// Returns the base tree identifier.
    #[must_use]
    pub const fn base_tree(&self) -> &ObjectSha {
        &self.base_tree
    }

    /// Returns uploaded blobs in upload order.
    #[must_use]
    pub fn blobs(&self) -> &[UploadedBlob] {
        &self.blobs
    }

    /// Returns paths scheduled for removal.
    #[must_use]
    pub fn removals(&self) -> &[FilePath] {
        &self.removals
    }

    /// Returns the new tree identifier, once created.
    #[must_use]
    pub const fn new_tree(&self) -> Option<&ObjectSha> {
        self.new_tree.as_ref()
    }

    /// Returns the new commit identifier, once created.
    #[must_use]
    pub const fn new_commit(&self) -> Option<&ObjectSha> {
        self.new_commit.as_ref()
    }

    /// Returns `true` when the plan changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty() && self.removals.is_empty()
    }

    /// Builds tree entries overlaying the base tree.
    #[must_use]
    pub fn tree_entries(&self) -> Vec<TreeEntry> {
        let uploads = self
            .blobs
            .iter()
            .map(|blob| TreeEntry::blob(blob.path.clone(), blob.sha.clone()));
        let removals = self.removals.iter().cloned().map(TreeEntry::removal);
        uploads.chain(removals).collect()
    }
}

/// One entry of a tree overlay.
///
/// A missing `sha` removes the path from the base tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Repository-relative file path.
    pub path: FilePath,
    /// Git file mode.
    pub mode: String,
    /// Blob identifier, or `None` to delete the path.
    pub sha: Option<ObjectSha>,
}

impl TreeEntry {
    /// Creates an entry pointing `path` at a blob.
    #[must_use]
    pub fn blob(path: FilePath, sha: ObjectSha) -> Self {
        Self {
            path,
            mode: REGULAR_FILE_MODE.to_owned(),
            sha: Some(sha),
        }
    }

    /// Creates an entry removing `path`.
    #[must_use]
    pub fn removal(path: FilePath) -> Self {
        Self {
            path,
            mode: REGULAR_FILE_MODE.to_owned(),
            sha: None,
        }
    }
}

/// Commit metadata read from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit identifier.
    pub sha: ObjectSha,
    /// Root tree identifier.
    pub tree: ObjectSha,
    /// Commit message.
    pub message: String,
}

/// A commit to create on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCommit {
    /// Commit message.
    pub message: String,
    /// Root tree identifier.
    pub tree: ObjectSha,
    /// Parent commit identifiers.
    pub parents: Vec<ObjectSha>,
}
