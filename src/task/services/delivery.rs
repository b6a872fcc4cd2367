//! Task delivery pipeline: generation, extraction, and routing of changes.

use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::prompt::{PromptBuilder, PromptRenderError};
use crate::change_set::domain::ChangeSet;
use crate::change_set::services::ChangeSetExtractor;
use crate::task::{
    domain::{
        BranchNamer, Project, ProjectId, PullRequestDraft, PullRequestRecord, Task,
        TaskDomainError, TaskId,
    },
    ports::{
        CredentialError, CredentialProvider, DocumentStore, GenerationError, ProjectRepository,
        PullRequestRepository, TaskRepository, TaskRepositoryError, TextGenerator,
    },
};
use crate::vcs::{
    domain::{AccessToken, BranchName, RepositoryFullName},
    ports::VcsHost,
    services::{DeliveryFailure, DeliveryRequest, RepositoryCommitOrchestrator, SkippedFile},
};

/// Service-level errors for task delivery runs.
#[derive(Debug, Error)]
pub enum TaskDeliveryError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The task's project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Record store operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// A prompt could not be rendered.
    #[error(transparent)]
    Prompt(#[from] PromptRenderError),
    /// The text generator failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),
    /// The project owner's hosting credential is unavailable.
    #[error(transparent)]
    Credential(#[from] CredentialError),
    /// The commit and pull-request protocol failed.
    #[error(transparent)]
    Delivery(#[from] DeliveryFailure),
}

/// Result type for task delivery operations.
pub type TaskDeliveryResult<T> = Result<T, TaskDeliveryError>;

/// Outcome of a successful delivery run.
#[derive(Debug, Clone)]
pub struct TaskDeliveryReport {
    task: Task,
    changes: ChangeSet,
    pull_request: Option<PullRequestRecord>,
    skipped: Vec<SkippedFile>,
}

impl TaskDeliveryReport {
    /// Returns the completed task.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the extracted change set.
    #[must_use]
    pub const fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// Returns the recorded pull request; absent when nothing was extracted.
    #[must_use]
    pub const fn pull_request(&self) -> Option<&PullRequestRecord> {
        self.pull_request.as_ref()
    }

    /// Returns files whose upload the host refused.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }
}

struct Delivered {
    record: PullRequestRecord,
    skipped: Vec<SkippedFile>,
}

/// Runs a task end to end.
///
/// One run renders the prompts, asks the generator for an implementation,
/// extracts the proposed files, and delivers them: repository-backed
/// projects get a branch, a commit, and a pull request; local projects get
/// the files merged into their table and an open record without remote
/// identifiers. Each run is independent, so re-running a task produces a
/// new branch and record.
pub struct TaskDeliveryPipeline<S, G, P, H, C>
where
    S: DocumentStore,
    G: TextGenerator,
    P: CredentialProvider,
    H: VcsHost,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    generator: Arc<G>,
    credentials: Arc<P>,
    orchestrator: RepositoryCommitOrchestrator<H>,
    clock: Arc<C>,
    namer: BranchNamer<C>,
    prompts: PromptBuilder,
    extractor: ChangeSetExtractor,
    fallback_base: BranchName,
}

impl<S, G, P, H, C> TaskDeliveryPipeline<S, G, P, H, C>
where
    S: DocumentStore,
    G: TextGenerator,
    P: CredentialProvider,
    H: VcsHost,
    C: Clock + Send + Sync,
{
    /// Creates a pipeline whose fallback base branch is `main`.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        generator: Arc<G>,
        credentials: Arc<P>,
        orchestrator: RepositoryCommitOrchestrator<H>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            store,
            generator,
            credentials,
            orchestrator,
            namer: BranchNamer::new(Arc::clone(&clock)),
            clock,
            prompts: PromptBuilder::new(),
            extractor: ChangeSetExtractor::new(),
            fallback_base: BranchName::default(),
        }
    }

    /// Sets the base branch used when a repository's default is unknown
    /// and cannot be read.
    #[must_use]
    pub fn with_fallback_base_branch(mut self, branch: BranchName) -> Self {
        self.fallback_base = branch;
        self
    }

    /// Runs `task_id` once.
    ///
    /// The task moves to `in_progress`, then to `completed` on success or
    /// `failed` on any error. An empty extraction completes the task without
    /// a branch, commit, or pull request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDeliveryError`] when a record is missing, generation
    /// fails, the owner has no credential, or delivery fails. Remote objects
    /// created before a failure are left in place.
    #[instrument(skip_all, fields(task = %task_id))]
    pub async fn execute(&self, task_id: TaskId) -> TaskDeliveryResult<TaskDeliveryReport> {
        let mut task = TaskRepository::find_by_id(&*self.store, task_id)
            .await?
            .ok_or(TaskDeliveryError::TaskNotFound(task_id))?;
        let project = ProjectRepository::find_by_id(&*self.store, task.project_id())
            .await?
            .ok_or(TaskDeliveryError::ProjectNotFound(task.project_id()))?;

        task.start(&*self.clock);
        TaskRepository::update(&*self.store, &task).await?;

        let outcome = match self.run(&mut task, project).await {
            Ok(done) => self.finish(&mut task).await.map(|()| done),
            Err(error) => Err(error),
        };
        match outcome {
            Ok((changes, delivered)) => {
                info!(
                    files = changes.len(),
                    delivered = delivered.is_some(),
                    "task completed"
                );
                let (pull_request, skipped) = delivered
                    .map_or((None, Vec::new()), |run| (Some(run.record), run.skipped));
                Ok(TaskDeliveryReport {
                    task,
                    changes,
                    pull_request,
                    skipped,
                })
            }
            Err(error) => {
                self.record_failure(&mut task, &error).await;
                Err(error)
            }
        }
    }

    async fn run(
        &self,
        task: &mut Task,
        mut project: Project,
    ) -> TaskDeliveryResult<(ChangeSet, Option<Delivered>)> {
        let request = self.prompts.task_request(&project, task)?;
        let response = self.generator.generate(&request).await?;
        task.record_response(response, &*self.clock);
        TaskRepository::update(&*self.store, task).await?;

        let changes = self
            .extractor
            .extract(task.response().unwrap_or_default());
        if changes.is_empty() {
            info!("generated text proposed no files");
            return Ok((changes, None));
        }

        let branch = self.namer.name_for(task.title())?;
        let delivered = match project.repository().cloned() {
            Some(repository) => {
                self.deliver_remote(task, &mut project, repository, branch, &changes)
                    .await?
            }
            None => self.deliver_local(task, &mut project, branch, &changes).await?,
        };
        PullRequestRepository::store(&*self.store, &delivered.record).await?;
        task.attach_pull_request(delivered.record.id(), &*self.clock);
        Ok((changes, Some(delivered)))
    }

    async fn deliver_remote(
        &self,
        task: &Task,
        project: &mut Project,
        repository: RepositoryFullName,
        branch: BranchName,
        changes: &ChangeSet,
    ) -> TaskDeliveryResult<Delivered> {
        let token = self.credentials.token_for(project.owner()).await?;
        let base = self.resolve_base(&token, project, &repository).await?;

        let request = DeliveryRequest::new(repository, base.clone(), branch.clone(), task.title())
            .with_body(task.description());
        let receipt = self.orchestrator.deliver(&token, &request, changes).await?;
        let record = PullRequestRecord::remote(
            draft(task, branch, base, changes),
            receipt.pull_request().clone(),
            &*self.clock,
        );
        Ok(Delivered {
            record,
            skipped: receipt.skipped().to_vec(),
        })
    }

    async fn deliver_local(
        &self,
        task: &Task,
        project: &mut Project,
        branch: BranchName,
        changes: &ChangeSet,
    ) -> TaskDeliveryResult<Delivered> {
        let touched = project.merge_change_set(changes, &*self.clock)?;
        ProjectRepository::update(&*self.store, project).await?;
        info!(files = touched, "merged change set into local project");

        let record = PullRequestRecord::local(
            draft(task, branch, self.fallback_base.clone(), changes),
            &*self.clock,
        );
        Ok(Delivered {
            record,
            skipped: Vec::new(),
        })
    }

    /// Stored default branch, else the repository's reported default, else
    /// the configured fallback.
    async fn resolve_base(
        &self,
        token: &AccessToken,
        project: &mut Project,
        repository: &RepositoryFullName,
    ) -> TaskDeliveryResult<BranchName> {
        if let Some(stored) = project.default_branch() {
            return Ok(stored.clone());
        }

        match self.orchestrator.repository(token, repository).await {
            Ok(metadata) => {
                project.remember_default_branch(metadata.default_branch.clone(), &*self.clock);
                ProjectRepository::update(&*self.store, project).await?;
                Ok(metadata.default_branch)
            }
            Err(error) => {
                warn!(
                    repository = %repository,
                    fallback = %self.fallback_base,
                    error = %error,
                    "could not read default branch"
                );
                Ok(self.fallback_base.clone())
            }
        }
    }

    /// Persists the completed task; `task` stays in progress when saving fails.
    async fn finish(&self, task: &mut Task) -> TaskDeliveryResult<()> {
        let mut completed = task.clone();
        completed.complete(&*self.clock)?;
        TaskRepository::update(&*self.store, &completed).await?;
        *task = completed;
        Ok(())
    }

    async fn record_failure(&self, task: &mut Task, error: &TaskDeliveryError) {
        warn!(error = %error, "task failed");
        if let Err(transition) = task.fail(&*self.clock) {
            warn!(error = %transition, "could not mark task failed");
            return;
        }
        if let Err(persist) = TaskRepository::update(&*self.store, task).await {
            warn!(error = %persist, "could not persist failed task");
        }
    }
}

fn draft(
    task: &Task,
    source_branch: BranchName,
    base_branch: BranchName,
    changes: &ChangeSet,
) -> PullRequestDraft {
    PullRequestDraft {
        project_id: task.project_id(),
        task_id: task.id(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        source_branch,
        base_branch,
        files: changes.clone(),
    }
}
