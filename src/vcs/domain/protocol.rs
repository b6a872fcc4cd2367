//! Step and state vocabulary for the commit delivery protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One remote call of the delivery protocol, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolStep {
    /// Read the base branch head commit.
    ResolveBaseRef,
    /// Create the working branch at the base commit.
    CreateBranch,
    /// Read the base commit's tree.
    ReadBaseTree,
    /// Upload one blob per file.
    CreateBlobs,
    /// Build a tree overlaying the base tree.
    CreateTree,
    /// Create a commit wrapping the new tree.
    CreateCommit,
    /// Fast-forward the working branch to the commit.
    UpdateRef,
    /// Open a pull request from the working branch.
    OpenPullRequest,
}

impl ProtocolStep {
    /// Every step in execution order.
    pub const ALL: [Self; 8] = [
        Self::ResolveBaseRef,
        Self::CreateBranch,
        Self::ReadBaseTree,
        Self::CreateBlobs,
        Self::CreateTree,
        Self::CreateCommit,
        Self::UpdateRef,
        Self::OpenPullRequest,
    ];

    /// Returns the state reached once this step succeeds.
    #[must_use]
    pub const fn completes(self) -> ProtocolState {
        match self {
            Self::ResolveBaseRef => ProtocolState::RefResolved,
            Self::CreateBranch => ProtocolState::BranchCreated,
            Self::ReadBaseTree => ProtocolState::BaseTreeRead,
            Self::CreateBlobs => ProtocolState::BlobsCreated,
            Self::CreateTree => ProtocolState::TreeCreated,
            Self::CreateCommit => ProtocolState::CommitCreated,
            Self::UpdateRef => ProtocolState::RefUpdated,
            Self::OpenPullRequest => ProtocolState::PullRequestOpened,
        }
    }

    /// Returns the stable step identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ResolveBaseRef => "resolve_base_ref",
            Self::CreateBranch => "create_branch",
            Self::ReadBaseTree => "read_base_tree",
            Self::CreateBlobs => "create_blobs",
            Self::CreateTree => "create_tree",
            Self::CreateCommit => "create_commit",
            Self::UpdateRef => "update_ref",
            Self::OpenPullRequest => "open_pull_request",
        }
    }
}

impl fmt::Display for ProtocolStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Last milestone a delivery reached.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolState {
    /// Nothing has been sent yet.
    #[default]
    Started,
    /// The base branch head is known.
    RefResolved,
    /// The working branch exists remotely.
    BranchCreated,
    /// The base tree is known.
    BaseTreeRead,
    /// At least one blob was uploaded.
    BlobsCreated,
    /// The new tree exists.
    TreeCreated,
    /// The new commit exists.
    CommitCreated,
    /// The working branch points at the new commit.
    RefUpdated,
    /// The pull request is open.
    PullRequestOpened,
}

impl ProtocolState {
    /// Returns the step that must run next, or `None` when finished.
    #[must_use]
    pub const fn next_step(self) -> Option<ProtocolStep> {
        match self {
            Self::Started => Some(ProtocolStep::ResolveBaseRef),
            Self::RefResolved => Some(ProtocolStep::CreateBranch),
            Self::BranchCreated => Some(ProtocolStep::ReadBaseTree),
            Self::BaseTreeRead => Some(ProtocolStep::CreateBlobs),
            Self::BlobsCreated => Some(ProtocolStep::CreateTree),
            Self::TreeCreated => Some(ProtocolStep::CreateCommit),
            Self::CommitCreated => Some(ProtocolStep::UpdateRef),
            Self::RefUpdated => Some(ProtocolStep::OpenPullRequest),
            Self::PullRequestOpened => None,
        }
    }

    /// Returns the stable state identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::RefResolved => "ref_resolved",
            Self::BranchCreated => "branch_created",
            Self::BaseTreeRead => "base_tree_read",
            Self::BlobsCreated => "blobs_created",
            Self::TreeCreated => "tree_created",
            Self::CommitCreated => "commit_created",
            Self::RefUpdated => "ref_updated",
            Self::PullRequestOpened => "pull_request_opened",
        }
    }
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
