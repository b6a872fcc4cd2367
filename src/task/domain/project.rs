//! Project aggregate: the repository or file table tasks are delivered to.

use super::{ProjectId, TaskDomainError, UserId};
use crate::change_set::domain::{ChangeSet, FileAction, FilePath};
use crate::vcs::domain::{BranchName, RepositoryFullName};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Analysis status of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// An architectural summary is being produced.
    #[default]
    Analyzing,
    /// The summary is available.
    Ready,
    /// The last analysis failed.
    Error,
}

impl ProjectStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Analyzing => "analyzing",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file stored directly on a local project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    path: FilePath,
    content: String,
    size: usize,
}

impl ProjectFile {
    /// Creates a file entry, recording the content's byte length.
    #[must_use]
    pub fn new(path: FilePath, content: impl Into<String>) -> Self {
        let body = content.into();
        Self {
            size: body.len(),
            path,
            content: body,
        }
    }

    /// Returns the file path.
    #[must_use]
    pub const fn path(&self) -> &FilePath {
        &self.path
    }

    /// Returns the file body.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the body length in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    fn replace(&mut self, content: &str) {
        content.clone_into(&mut self.content);
        self.size = content.len();
    }
}

/// Where a project's files live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectSource {
    /// Files live in a hosted repository.
    Remote {
        /// Repository in `owner/repo` form.
        repository: RepositoryFullName,
        /// Default branch, when known.
        default_branch: Option<BranchName>,
    },
    /// Files are stored on the project record itself.
    Local {
        /// Stored file table.
        files: Vec<ProjectFile>,
    },
}

impl ProjectSource {
    /// Creates a repository-backed source with an unknown default branch.
    #[must_use]
    pub const fn remote(repository: RepositoryFullName) -> Self {
        Self::Remote {
            repository,
            default_branch: None,
        }
    }

    /// Creates a local source from an initial file table.
    #[must_use]
    pub const fn local(files: Vec<ProjectFile>) -> Self {
        Self::Local { files }
    }
}

/// Project aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    owner: UserId,
    name: String,
    description: String,
    tech_stack: Vec<String>,
    summary: Option<String>,
    status: ProjectStatus,
    source: ProjectSource,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a project awaiting analysis.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyProjectName`] when the trimmed name
    /// is empty.
    pub fn new(
        owner: UserId,
        name: impl Into<String>,
        source: ProjectSource,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let raw_name = name.into();
        let trimmed = raw_name.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyProjectName);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: ProjectId::new(),
            owner,
            name: trimmed.to_owned(),
            description: String::new(),
            tech_stack: Vec::new(),
            summary: None,
            status: ProjectStatus::Analyzing,
            source,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Sets the project description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the technologies the project uses.
    #[must_use]
    pub fn with_tech_stack<I, S>(mut self, tech_stack: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tech_stack = tech_stack.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the project description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the technologies the project uses.
    #[must_use]
    pub fn tech_stack(&self) -> &[String] {
        &self.tech_stack
    }

    /// Returns the architectural summary, once analysed.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Returns the analysis status.
    #[must_use]
    pub const fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Returns where the project's files live.
    #[must_use]
    pub const fn source(&self) -> &ProjectSource {
        &self.source
    }

    /// Returns the hosted repository for remote projects.
    #[must_use]
    pub const fn repository(&self) -> Option<&RepositoryFullName> {
        match &self.source {
            ProjectSource::Remote { repository, .. } => Some(repository),
            ProjectSource::Local { .. } => None,
        }
    }

    /// Returns the stored default branch for remote projects.
    #[must_use]
    pub const fn default_branch(&self) -> Option<&BranchName> {
        match &self.source {
            ProjectSource::Remote { default_branch, .. } => default_branch.as_ref(),
            ProjectSource::Local { .. } => None,
        }
    }

    /// Returns the stored file table; empty for remote projects.
    #[must_use]
    pub fn files(&self) -> &[ProjectFile] {
        match &self.source {
            ProjectSource::Local { files } => files,
            ProjectSource::Remote { .. } => &[],
        }
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

    /// Records the default branch of a remote project.
    pub fn remember_default_branch(&mut self, branch: BranchName, clock: &impl Clock) {
        if let ProjectSource::Remote { default_branch, .. } = &mut self.source {
            *default_branch = Some(branch);
            self.touch(clock);
        }
    }

    /// Marks the project as being analysed.
    pub fn begin_analysis(&mut self, clock: &impl Clock) {
        self.status = ProjectStatus::Analyzing;
        self.touch(clock);
    }

    /// Stores an architectural summary and marks the project ready.
    pub fn record_summary(&mut self, summary: impl Into<String>, clock: &impl Clock) {
        self.summary = Some(summary.into());
        self.status = ProjectStatus::Ready;
        self.touch(clock);
    }

    /// Marks the last analysis as failed, keeping any previous summary.
    pub fn mark_analysis_failed(&mut self, clock: &impl Clock) {
        self.status = ProjectStatus::Error;
        self.touch(clock);
    }

    /// Upserts every change into the local file table.
    ///
    /// Existing paths have their content and size replaced; new paths are
    /// appended in change-set order. Delete actions remove the path.
    /// Returns the number of entries touched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotLocalProject`] for remote projects.
    pub fn merge_change_set(
        &mut self,
        changes: &ChangeSet,
        clock: &impl Clock,
    ) -> Result<usize, TaskDomainError> {
        let ProjectSource::Local { files } = &mut self.source else {
            return Err(TaskDomainError::NotLocalProject(self.id));
        };

        let mut touched = 0;
        for change in changes {
            let position = files.iter().position(|file| file.path() == change.path());
            match (change.action(), position) {
                (FileAction::Delete, Some(index)) => {
                    files.remove(index);
                    touched += 1;
                }
                (FileAction::Delete, None) => {}
                (_, Some(index)) => {
                    if let Some(file) = files.get_mut(index) {
                        file.replace(change.content());
                        touched += 1;
                    }
                }
                (_, None) => {
                    files.push(ProjectFile::new(change.path().clone(), change.content()));
                    touched += 1;
                }
            }
        }
        self.touch(clock);
        Ok(touched)
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
