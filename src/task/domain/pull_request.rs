//! Pull-request records persisted for every delivered change set.

use super::{ProjectId, PullRequestId, TaskDomainError, TaskId};
use crate::change_set::domain::ChangeSet;
use crate::vcs::domain::{BranchName, PullRequestNumber, RemotePullRequest};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review status of a pull-request record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestStatus {
    /// Awaiting review.
    #[default]
    Open,
    /// Merged into the base branch.
    Merged,
    /// Closed without merging.
    Closed,
}

impl PullRequestStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Merged => "merged",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter object describing a freshly delivered change set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDraft {
    /// Project the change targets.
    pub project_id: ProjectId,
    /// Task whose run produced the change.
    pub task_id: TaskId,
    /// Review title.
    pub title: String,
    /// Review description.
    pub description: String,
    /// Branch carrying the change.
    pub source_branch: BranchName,
    /// Branch the change targets.
    pub base_branch: BranchName,
    /// Delivered files.
    pub files: ChangeSet,
}

/// Hosting-service identifiers of a remote pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteReference {
    number: PullRequestNumber,
    url: String,
}

impl RemoteReference {
    /// Returns the host-assigned number.
    #[must_use]
    pub const fn number(&self) -> PullRequestNumber {
        self.number
    }

    /// Returns the review URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl From<RemotePullRequest> for RemoteReference {
    fn from(value: RemotePullRequest) -> Self {
        Self {
            number: value.number,
            url: value.url,
        }
    }
}

/// Persisted record of a delivered change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    id: PullRequestId,
    project_id: ProjectId,
    task_id: TaskId,
    title: String,
    description: String,
    source_branch: BranchName,
    base_branch: BranchName,
    remote: Option<RemoteReference>,
    files: ChangeSet,
    status: PullRequestStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PullRequestRecord {
    /// Records a change set merged straight into a local project.
    #[must_use]
    pub fn local(draft: PullRequestDraft, clock: &impl Clock) -> Self {
        Self::open(draft, None, clock)
    }

    /// Records a change set delivered to a hosted repository.
    #[must_use]
    pub fn remote(draft: PullRequestDraft, remote: RemotePullRequest, clock: &impl Clock) -> Self {
        Self::open(draft, Some(remote.into()), clock)
    }

    fn open(draft: PullRequestDraft, remote: Option<RemoteReference>, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: PullRequestId::new(),
            project_id: draft.project_id,
            task_id: draft.task_id,
            title: draft.title,
            description: draft.description,
            source_branch: draft.source_branch,
            base_branch: draft.base_branch,
            remote,
            files: draft.files,
            status: PullRequestStatus::Open,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> PullRequestId {
        self.id
    }

    /// Returns the target project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the originating task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the review title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the review description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the branch carrying the change.
    #[must_use]
    pub const fn source_branch(&self) -> &BranchName {
        &self.source_branch
    }

    /// Returns the branch the change targets.
    #[must_use]
    pub const fn base_branch(&self) -> &BranchName {
        &self.base_branch
    }

    /// Returns the hosting-service identifiers, absent for local projects.
    #[must_use]
    pub const fn remote_reference(&self) -> Option<&RemoteReference> {
        self.remote.as_ref()
    }

    /// Returns the host-assigned number, absent for local projects.
    #[must_use]
    pub fn number(&self) -> Option<PullRequestNumber> {
        self.remote.as_ref().map(RemoteReference::number)
    }

    /// Returns the delivered files.
    #[must_use]
    pub const fn files(&self) -> &ChangeSet {
        &self.files
    }

    /// Returns the review status.
    #[must_use]
    pub const fn status(&self) -> PullRequestStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Fails unless the record is still open.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::PullRequestNotOpen`] for merged or closed
    /// records.
    pub const fn ensure_open(&self) -> Result<(), TaskDomainError> {
        match self.status {
            PullRequestStatus::Open => Ok(()),
            status => Err(TaskDomainError::PullRequestNotOpen {
                pull_request: self.id,
                status,
            }),
        }
    }

    /// Marks an open record as merged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::PullRequestNotOpen`] when already merged or
    /// closed.
    pub fn mark_merged(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.settle(PullRequestStatus::Merged, clock)
    }

    /// Marks an open record as closed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::PullRequestNotOpen`] when already merged or
    /// closed.
    pub fn close(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.settle(PullRequestStatus::Closed, clock)
    }

    fn settle(&mut self, status: PullRequestStatus, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_open()?;
        self.status = status;
        self.updated_at = clock.utc();
        Ok(())
    }
}
