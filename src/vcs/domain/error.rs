//! Error types for VCS value-object validation.

use thiserror::Error;

/// Errors returned while constructing VCS domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VcsDomainError {
    /// The repository name does not follow `owner/repo` format.
    #[error("invalid repository name '{0}', expected owner/repo")]
    InvalidRepository(String),

    /// The branch name is empty or contains forbidden characters.
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    /// The pull request number is invalid.
    #[error("invalid pull request number {0}, expected a positive integer")]
    InvalidPullRequestNumber(u64),

    /// The object identifier is not a hexadecimal digest.
    #[error("invalid object sha: {0}")]
    InvalidObjectSha(String),
}
