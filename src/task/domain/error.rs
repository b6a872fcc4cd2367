//! Error types for task domain validation and parsing.

use super::{ProjectId, PullRequestId, PullRequestStatus, TaskId, TaskState};
use crate::vcs::domain::VcsDomainError;
use thiserror::Error;

/// Errors returned while constructing or mutating task records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// The requested lifecycle transition is not permitted.
    #[error("task {task} cannot move from {from} to {to}")]
    InvalidStateTransition {
        /// Task being transitioned.
        task: TaskId,
        /// Current state.
        from: TaskState,
        /// Requested state.
        to: TaskState,
    },

    /// A review action targeted a pull request that is no longer open.
    #[error("pull request {pull_request} is {status}, expected open")]
    PullRequestNotOpen {
        /// Pull-request record identifier.
        pull_request: PullRequestId,
        /// Current review status.
        status: PullRequestStatus,
    },

    /// A file-table operation targeted a repository-backed project.
    #[error("project {0} is not a local project")]
    NotLocalProject(ProjectId),

    /// A derived hosting-service value failed validation.
    #[error(transparent)]
    Vcs(#[from] VcsDomainError),
}

/// Error returned while parsing task states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);

/// Error returned while parsing task priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);
