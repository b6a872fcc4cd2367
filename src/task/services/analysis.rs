//! Architectural summaries of projects.

use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::prompt::{PromptBuilder, PromptRenderError, local_excerpts, repository_listing};
use crate::task::{
    domain::{Project, ProjectId, ProjectSource},
    ports::{
        CredentialProvider, DocumentStore, GenerationError, ProjectRepository, TaskRepositoryError,
        TextGenerator,
    },
};
use crate::vcs::{domain::RepositoryFullName, ports::VcsHost, services::RepositoryCommitOrchestrator};

/// Service-level errors for project analysis.
#[derive(Debug, Error)]
pub enum ProjectAnalysisError {
    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    /// Record store operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// The prompt could not be rendered.
    #[error(transparent)]
    Prompt(#[from] PromptRenderError),
    /// The text generator failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Result type for project analysis.
pub type ProjectAnalysisResult<T> = Result<T, ProjectAnalysisError>;

/// Asks the text generator for a project summary and stores it.
pub struct ProjectAnalysisService<S, G, P, H, C>
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
    prompts: PromptBuilder,
}

impl<S, G, P, H, C> ProjectAnalysisService<S, G, P, H, C>
where
    S: DocumentStore,
    G: TextGenerator,
    P: CredentialProvider,
    H: VcsHost,
    C: Clock + Send + Sync,
{
    /// Creates an analysis service.
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
            clock,
            prompts: PromptBuilder::new(),
        }
    }

    /// Produces and stores a summary for `project_id`.
    ///
    /// Remote projects contribute the names of their root files; local
    /// projects contribute excerpts of their first files. A failed listing
    /// leaves the file context empty. The project ends `ready` with the new
    /// summary, or `error` when generation fails.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectAnalysisError`] when the project is missing, the
    /// prompt cannot be rendered, or generation fails.
    #[instrument(skip_all, fields(project = %project_id))]
    pub async fn analyze(&self, project_id: ProjectId) -> ProjectAnalysisResult<Project> {
        let mut project = ProjectRepository::find_by_id(&*self.store, project_id)
            .await?
            .ok_or(ProjectAnalysisError::ProjectNotFound(project_id))?;
        project.begin_analysis(&*self.clock);
        ProjectRepository::update(&*self.store, &project).await?;

        let files = match project.source() {
            ProjectSource::Remote { repository, .. } => {
                self.remote_context(&project, repository).await
            }
            ProjectSource::Local { files } => local_excerpts(files),
        };

        match self.summarise(&project, &files).await {
            Ok(summary) => {
                project.record_summary(summary, &*self.clock);
                ProjectRepository::update(&*self.store, &project).await?;
                info!("project analysed");
                Ok(project)
            }
            Err(error) => {
                warn!(error = %error, "project analysis failed");
                project.mark_analysis_failed(&*self.clock);
                ProjectRepository::update(&*self.store, &project).await?;
                Err(error)
            }
        }
    }

    async fn summarise(&self, project: &Project, files: &str) -> ProjectAnalysisResult<String> {
        let request = self.prompts.analysis_request(project, files)?;
        Ok(self.generator.generate(&request).await?)
    }

    async fn remote_context(&self, project: &Project, repository: &RepositoryFullName) -> String {
        let token = match self.credentials.token_for(project.owner()).await {
            Ok(token) => token,
            Err(error) => {
                warn!(error = %error, "no credential for repository listing");
                return String::new();
            }
        };
        match self.orchestrator.list_root(&token, repository).await {
            Ok(entries) => repository_listing(&entries),
            Err(error) => {
                warn!(repository = %repository, error = %error, "repository listing failed");
                String::new()
            }
        }
    }
}
