//! In-memory document store for task, project, and pull-request records.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{Project, ProjectId, PullRequestId, PullRequestRecord, Task, TaskId},
    ports::{
        ProjectRepository, PullRequestRepository, TaskRepository, TaskRepositoryError,
        TaskRepositoryResult,
    },
};

/// Thread-safe in-memory store implementing every record port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    state: Arc<RwLock<InMemoryDocumentState>>,
}

#[derive(Debug, Default)]
struct InMemoryDocumentState {
    tasks: HashMap<TaskId, Task>,
    task_order: Vec<TaskId>,
    projects: HashMap<ProjectId, Project>,
    pull_requests: HashMap<PullRequestId, PullRequestRecord>,
    pull_request_order: Vec<PullRequestId>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryDocumentState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryDocumentState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl TaskRepository for InMemoryDocumentStore {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.task_order.push(task.id());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::TaskNotFound(task.id()))?;
        *stored = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_project(&self, project: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state
            .task_order
            .iter()
            .filter_map(|id| state.tasks.get(id))
            .filter(|task| task.project_id() == project)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProjectRepository for InMemoryDocumentStore {
    async fn store(&self, project: &Project) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.projects.contains_key(&project.id()) {
            return Err(TaskRepositoryError::DuplicateProject(project.id()));
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn update(&self, project: &Project) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .projects
            .get_mut(&project.id())
            .ok_or(TaskRepositoryError::ProjectNotFound(project.id()))?;
        *stored = project.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: ProjectId) -> TaskRepositoryResult<Option<Project>> {
        let state = self.read()?;
        Ok(state.projects.get(&id).cloned())
    }
}

#[async_trait]
impl PullRequestRepository for InMemoryDocumentStore {
    async fn store(&self, record: &PullRequestRecord) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.pull_requests.contains_key(&record.id()) {
            return Err(TaskRepositoryError::DuplicatePullRequest(record.id()));
        }
        state.pull_request_order.push(record.id());
        state.pull_requests.insert(record.id(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &PullRequestRecord) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .pull_requests
            .get_mut(&record.id())
            .ok_or(TaskRepositoryError::PullRequestNotFound(record.id()))?;
        *stored = record.clone();
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: PullRequestId,
    ) -> TaskRepositoryResult<Option<PullRequestRecord>> {
        let state = self.read()?;
        Ok(state.pull_requests.get(&id).cloned())
    }

    async fn find_by_task(&self, task: TaskId) -> TaskRepositoryResult<Vec<PullRequestRecord>> {
        let state = self.read()?;
        Ok(state
            .pull_request_order
            .iter()
            .filter_map(|id| state.pull_requests.get(id))
            .filter(|record| record.task_id() == task)
            .cloned()
            .collect())
    }
}
