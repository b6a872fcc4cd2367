//! Review actions on delivered pull-request records.

use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

use crate::change_set::domain::{FileAction, FileChange};
use crate::task::{
    domain::{Project, ProjectId, PullRequestId, PullRequestRecord, TaskDomainError},
    ports::{
        CredentialError, CredentialProvider, DocumentStore, ProjectRepository,
        PullRequestRepository, TaskRepositoryError,
    },
};
use crate::vcs::{
    domain::{AccessToken, FileStatus, PullRequestFile, PullRequestNumber, RepositoryFullName},
    ports::{VcsHost, VcsHostError},
    services::RepositoryCommitOrchestrator,
};

/// Service-level errors for pull-request review actions.
#[derive(Debug, Error)]
pub enum PullRequestReviewError {
    /// The record does not exist.
    #[error("pull request not found: {0}")]
    NotFound(PullRequestId),
    /// The record's project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    /// A remote record belongs to a project without a repository.
    #[error("project {0} has no hosted repository")]
    MissingRepository(ProjectId),
    /// The host answered the merge without merging.
    #[error("host declined to merge pull request #{number}: {message}")]
    MergeDeclined {
        /// Host-assigned number.
        number: PullRequestNumber,
        /// Host-provided message.
        message: String,
    },
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Record store operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// The project owner's hosting credential is unavailable.
    #[error(transparent)]
    Credential(#[from] CredentialError),
    /// The host call failed.
    #[error(transparent)]
    Host(#[from] VcsHostError),
}

/// Result type for review operations.
pub type PullRequestReviewResult<T> = Result<T, PullRequestReviewError>;

/// Merges, closes, and inspects pull-request records.
///
/// Records with a host-assigned number are merged on the host with a squash
/// strategy; local records change status only.
pub struct PullRequestReviewService<S, P, H, C>
where
    S: DocumentStore,
    P: CredentialProvider,
    H: VcsHost,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    credentials: Arc<P>,
    orchestrator: RepositoryCommitOrchestrator<H>,
    clock: Arc<C>,
}

impl<S, P, H, C> PullRequestReviewService<S, P, H, C>
where
    S: DocumentStore,
    P: CredentialProvider,
    H: VcsHost,
    C: Clock + Send + Sync,
{
    /// Creates a review service.
    #[must_use]
    pub const fn new(
        store: Arc<S>,
        credentials: Arc<P>,
        orchestrator: RepositoryCommitOrchestrator<H>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            store,
            credentials,
            orchestrator,
            clock,
        }
    }

    /// Merges an open record.
    ///
    /// The record is marked merged only after the host confirms the merge.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestReviewError`] when the record is missing or not
    /// open, the owner has no credential, or the host refuses the merge.
    #[instrument(skip_all, fields(pull_request = %id))]
    pub async fn merge(&self, id: PullRequestId) -> PullRequestReviewResult<PullRequestRecord> {
        let mut record = self.load(id).await?;
        record.ensure_open()?;

        if let Some(number) = record.number() {
            let (token, repository) = self.remote_access(record.project_id()).await?;
            let outcome = self
                .orchestrator
                .merge_pull_request(&token, &repository, number)
                .await?;
            if !outcome.merged {
                return Err(PullRequestReviewError::MergeDeclined {
                    number,
                    message: outcome.message,
                });
            }
            info!(number = %number, "merged pull request on host");
        }

        record.mark_merged(&*self.clock)?;
        PullRequestRepository::update(&*self.store, &record).await?;
        Ok(record)
    }

    /// Closes an open record without merging.
    ///
    /// No host call is made.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestReviewError`] when the record is missing or not
    /// open.
    pub async fn close(&self, id: PullRequestId) -> PullRequestReviewResult<PullRequestRecord> {
        let mut record = self.load(id).await?;
        record.close(&*self.clock)?;
        PullRequestRepository::update(&*self.store, &record).await?;
        Ok(record)
    }

    /// Lists the files a record changes.
    ///
    /// Remote records ask the host; local records summarise their stored
    /// change set.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestReviewError`] when the record is missing, the
    /// owner has no credential, or the host call fails.
    pub async fn changed_files(
        &self,
        id: PullRequestId,
    ) -> PullRequestReviewResult<Vec<PullRequestFile>> {
        let record = self.load(id).await?;
        let Some(number) = record.number() else {
            return Ok(record.files().iter().map(local_file_summary).collect());
        };

        let (token, repository) = self.remote_access(record.project_id()).await?;
        Ok(self
            .orchestrator
            .pull_request_files(&token, &repository, number)
            .await?)
    }

    async fn load(&self, id: PullRequestId) -> PullRequestReviewResult<PullRequestRecord> {
        PullRequestRepository::find_by_id(&*self.store, id)
            .await?
            .ok_or(PullRequestReviewError::NotFound(id))
    }

    async fn remote_access(
        &self,
        project_id: ProjectId,
    ) -> PullRequestReviewResult<(AccessToken, RepositoryFullName)> {
        let project: Project = ProjectRepository::find_by_id(&*self.store, project_id)
            .await?
            .ok_or(PullRequestReviewError::ProjectNotFound(project_id))?;
        let repository = project
            .repository()
            .cloned()
            .ok_or(PullRequestReviewError::MissingRepository(project_id))?;
        let token = self.credentials.token_for(project.owner()).await?;
        Ok((token, repository))
    }
}

fn local_file_summary(change: &FileChange) -> PullRequestFile {
    let lines = u64::try_from(change.content().lines().count()).unwrap_or(u64::MAX);
    let (status, additions, deletions) = match change.action() {
        FileAction::Create => (FileStatus::Added, lines, 0),
        FileAction::Modify => (FileStatus::Modified, lines, 0),
        FileAction::Delete => (FileStatus::Removed, 0, lines),
    };
    PullRequestFile {
        filename: change.path().to_string(),
        status,
        additions,
        deletions,
    }
}
