//! Port contracts for task delivery.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod credentials;
pub mod generation;
pub mod repository;

pub use credentials::{CredentialError, CredentialProvider, CredentialResult};
pub use generation::{GenerationError, GenerationRequest, GenerationResult, TextGenerator};
pub use repository::{
    DocumentStore, ProjectRepository, PullRequestRepository, TaskRepository, TaskRepositoryError,
    TaskRepositoryResult,
};
