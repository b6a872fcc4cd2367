//! Hosting-service port for Git data and pull request operations.

use crate::change_set::domain::FilePath;
use crate::vcs::domain::{
    AccessToken, BranchName, CommitInfo, ContentEntry, FileWrite, MergeMethod, MergeOutcome,
    NewCommit, NewPullRequest, ObjectSha, PullRequestFile, PullRequestNumber, RemoteFile,
    RemotePullRequest, RepositoryFullName, RepositoryMetadata, TreeEntry,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for hosting-service operations.
pub type VcsHostResult<T> = Result<T, VcsHostError>;

/// Git data and pull request contract of a hosting service.
///
/// Every call is authorized by the supplied token and scoped to one
/// repository.
#[async_trait]
pub trait VcsHost: Send + Sync {
    /// Resolves the commit a branch points to.
    ///
    /// # Errors
    ///
    /// Returns [`VcsHostError::NotFound`] when the branch does not exist.
    async fn get_ref(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        branch: &BranchName,
    ) -> VcsHostResult<ObjectSha>;

    /// Creates a branch pointing at `sha`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsHostError::RefAlreadyExists`] when the branch exists.
    async fn create_ref(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        branch: &BranchName,
        sha: &ObjectSha,
    ) -> VcsHostResult<()>;

    /// Reads commit metadata, including its root tree.
    async fn get_commit(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        sha: &ObjectSha,
    ) -> VcsHostResult<CommitInfo>;

    /// Uploads UTF-8 content as a blob.
    async fn create_blob(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        content: &str,
    ) -> VcsHostResult<ObjectSha>;

    /// Builds a tree by overlaying `entries` on `base_tree`.
    async fn create_tree(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        base_tree: &ObjectSha,
        entries: &[TreeEntry],
    ) -> VcsHostResult<ObjectSha>;

    /// Creates a commit object.
    async fn create_commit(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        commit: &NewCommit,
    ) -> VcsHostResult<ObjectSha>;

    /// Moves a branch to `sha` without forcing.
    ///
    /// # Errors
    ///
    /// Returns [`VcsHostError::Rejected`] when the move is not a
    /// fast-forward.
    async fn update_ref(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        branch: &BranchName,
        sha: &ObjectSha,
    ) -> VcsHostResult<()>;

    /// Opens a pull request.
    async fn create_pull_request(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        request: &NewPullRequest,
    ) -> VcsHostResult<RemotePullRequest>;

    /// Merges a pull request.
    async fn merge_pull_request(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        number: PullRequestNumber,
        method: MergeMethod,
    ) -> VcsHostResult<MergeOutcome>;

    /// Lists the files a pull request changes.
    async fn list_pull_request_files(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        number: PullRequestNumber,
    ) -> VcsHostResult<Vec<PullRequestFile>>;

    /// Reads repository metadata.
    async fn get_repository(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
    ) -> VcsHostResult<RepositoryMetadata>;

    /// Lists a directory of the default branch; `None` lists the root.
    async fn list_contents(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        directory: Option<&FilePath>,
    ) -> VcsHostResult<Vec<ContentEntry>>;

    /// Reads a file from a branch, returning `None` when it is absent.
    async fn get_file(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        path: &FilePath,
        branch: &BranchName,
    ) -> VcsHostResult<Option<RemoteFile>>;

    /// Creates or updates one file in its own commit, returning the commit.
    ///
    /// # Errors
    ///
    /// Returns [`VcsHostError::Rejected`] when `write.previous` does not
    /// match the file currently on the branch.
    async fn put_file(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        write: &FileWrite,
    ) -> VcsHostResult<ObjectSha>;
}

/// Errors returned by hosting-service adapters.
#[derive(Debug, Clone, Error)]
pub enum VcsHostError {
    /// The addressed repository, ref, object, or pull request is missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// A branch with the requested name already exists.
    #[error("reference already exists: {0}")]
    RefAlreadyExists(BranchName),

    /// The host refused the request.
    #[error("host rejected request with status {status}: {message}")]
    Rejected {
        /// HTTP-style status code.
        status: u16,
        /// Host-provided message.
        message: String,
    },

    /// The call did not finish within its timeout.
    #[error("host call timed out after {0:?}")]
    TimedOut(Duration),

    /// The host answered with a payload the adapter could not interpret.
    #[error("invalid host response: {0}")]
    InvalidResponse(String),

    /// Network or runtime failure.
    #[error("host transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl VcsHostError {
    /// Wraps a transport or runtime error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Returns the HTTP-style status code when the host reported one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::RefAlreadyExists(_) => Some(422),
            Self::Rejected { status, .. } => Some(*status),
            Self::TimedOut(_) | Self::InvalidResponse(_) | Self::Transport(_) => None,
        }
    }
}
