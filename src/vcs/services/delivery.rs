//! Request, receipt, and failure types of a commit delivery.

use crate::change_set::domain::FilePath;
use crate::vcs::{
    domain::{
        Branch, BranchName, CommitPlan, ProtocolState, ProtocolStep, RemotePullRequest,
        RepositoryFullName,
    },
    ports::VcsHostError,
};
use std::time::Duration;
use thiserror::Error;

/// Parameters of one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    repository: RepositoryFullName,
    base_branch: BranchName,
    branch: BranchName,
    title: String,
    commit_message: Option<String>,
    body: String,
}

impl DeliveryRequest {
    /// Creates a request delivering onto a new `branch` cut from
    /// `base_branch`.
    #[must_use]
    pub fn new(
        repository: RepositoryFullName,
        base_branch: BranchName,
        branch: BranchName,
        title: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            base_branch,
            branch,
            title: title.into(),
            commit_message: None,
            body: String::new(),
        }
    }

    /// Sets the commit message. Defaults to the title.
    #[must_use]
    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = Some(message.into());
        self
    }

    /// Sets the pull request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the target repository.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryFullName {
        &self.repository
    }

    /// Returns the branch the work is based on.
    #[must_use]
    pub const fn base_branch(&self) -> &BranchName {
        &self.base_branch
    }

    /// Returns the working branch to create.
    #[must_use]
    pub const fn branch(&self) -> &BranchName {
        &self.branch
    }

    /// Returns the pull request title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the commit message.
    #[must_use]
    pub fn commit_message(&self) -> &str {
        self.commit_message.as_deref().unwrap_or(&self.title)
    }

    /// Returns the pull request body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// A file left out of the commit because its blob upload failed.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    /// Path of the skipped file.
    pub path: FilePath,
    /// Upload failure.
    pub error: VcsHostError,
}

/// Outcome of a completed delivery.
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    branch: Branch,
    plan: CommitPlan,
    pull_request: RemotePullRequest,
    skipped: Vec<SkippedFile>,
}

impl DeliveryReceipt {
    pub(super) const fn new(
        branch: Branch,
        plan: CommitPlan,
        pull_request: RemotePullRequest,
        skipped: Vec<SkippedFile>,
    ) -> Self {
        Self {
            branch,
            plan,
            pull_request,
            skipped,
        }
    }

    /// Returns the working branch, advanced to the new commit.
    #[must_use]
    pub const fn branch(&self) -> &Branch {
        &self.branch
    }

    /// Returns the final commit plan.
    #[must_use]
    pub const fn plan(&self) -> &CommitPlan {
        &self.plan
    }

    /// Returns the opened pull request.
    #[must_use]
    pub const fn pull_request(&self) -> &RemotePullRequest {
        &self.pull_request
    }

    /// Returns files whose upload failed.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }
}

/// Why a delivery stopped.
#[derive(Debug, Clone, Error)]
pub enum DeliveryFailureReason {
    /// There was nothing to commit.
    #[error("change set is empty")]
    EmptyChangeSet,

    /// Every blob upload failed.
    #[error("none of {attempted} blob uploads succeeded")]
    NoBlobsCreated {
        /// Number of uploads attempted.
        attempted: usize,
    },

    /// The delivery budget ran out.
    #[error("delivery budget of {0:?} exhausted")]
    TimedOut(Duration),

    /// A host call failed.
    #[error(transparent)]
    Host(#[from] VcsHostError),
}

/// A delivery that stopped before the pull request was opened.
///
/// Remote objects created before the failure are left in place.
#[derive(Debug, Clone, Error)]
#[error("delivery failed at {step} after reaching {last_completed}: {reason}")]
pub struct DeliveryFailure {
    step: ProtocolStep,
    last_completed: ProtocolState,
    reason: DeliveryFailureReason,
    branch: Option<BranchName>,
}

impl DeliveryFailure {
    pub(super) const fn new(
        step: ProtocolStep,
        last_completed: ProtocolState,
        reason: DeliveryFailureReason,
        branch: Option<BranchName>,
    ) -> Self {
        Self {
            step,
            last_completed,
            reason,
            branch,
        }
    }

    /// Returns the step that failed.
    #[must_use]
    pub const fn step(&self) -> ProtocolStep {
        self.step
    }

    /// Returns the last milestone reached.
    #[must_use]
    pub const fn last_completed(&self) -> ProtocolState {
        self.last_completed
    }

    /// Returns the failure reason.
    #[must_use]
    pub const fn reason(&self) -> &DeliveryFailureReason {
        &self.reason
    }

    /// Returns the working branch when it was created before the failure.
    #[must_use]
    pub const fn branch(&self) -> Option<&BranchName> {
        self.branch.as_ref()
    }

    /// Returns `true` when the delivery budget ran out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.reason, DeliveryFailureReason::TimedOut(_))
    }
}
