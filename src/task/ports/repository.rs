//! Document-store ports for task, project, and pull-request records.

use crate::task::domain::{
    Project, ProjectId, PullRequestId, PullRequestRecord, Task, TaskId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for record store operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::TaskNotFound`] when the task does not
    /// exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task of a project, oldest first.
    async fn find_by_project(&self, project: ProjectId) -> TaskRepositoryResult<Vec<Task>>;
}

/// Project persistence contract.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Stores a new project.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateProject`] when the project ID
    /// already exists.
    async fn store(&self, project: &Project) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing project.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::ProjectNotFound`] when the project does
    /// not exist.
    async fn update(&self, project: &Project) -> TaskRepositoryResult<()>;

    /// Finds a project by identifier.
    async fn find_by_id(&self, id: ProjectId) -> TaskRepositoryResult<Option<Project>>;
}

/// Pull-request record persistence contract.
#[async_trait]
pub trait PullRequestRepository: Send + Sync {
    /// Stores a new record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicatePullRequest`] when the record
    /// ID already exists.
    async fn store(&self, record: &PullRequestRecord) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::PullRequestNotFound`] when the record
    /// does not exist.
    async fn update(&self, record: &PullRequestRecord) -> TaskRepositoryResult<()>;

    /// Finds a record by identifier.
    async fn find_by_id(&self, id: PullRequestId)
    -> TaskRepositoryResult<Option<PullRequestRecord>>;

    /// Returns every record produced by a task, oldest first.
    async fn find_by_task(&self, task: TaskId) -> TaskRepositoryResult<Vec<PullRequestRecord>>;
}

/// A store holding all three record kinds.
pub trait DocumentStore: TaskRepository + ProjectRepository + PullRequestRepository {}

impl<T> DocumentStore for T where T: TaskRepository + ProjectRepository + PullRequestRepository {}

/// Errors returned by record store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A project with the same identifier already exists.
    #[error("duplicate project identifier: {0}")]
    DuplicateProject(ProjectId),

    /// A pull-request record with the same identifier already exists.
    #[error("duplicate pull request identifier: {0}")]
    DuplicatePullRequest(PullRequestId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The project was not found.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The pull-request record was not found.
    #[error("pull request not found: {0}")]
    PullRequestNotFound(PullRequestId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
