//! Credential port resolving per-user hosting-service tokens.

use crate::task::domain::UserId;
use crate::vcs::domain::AccessToken;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for credential lookups.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Supplies the bearer token a user authorised for the hosting service.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns the token for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Missing`] when the user has not connected
    /// a hosting account.
    async fn token_for(&self, user: UserId) -> CredentialResult<AccessToken>;
}

/// Errors returned by credential providers.
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    /// No token is stored for the user.
    #[error("no hosting credential for user {0}")]
    Missing(UserId),

    /// The backing store failed.
    #[error("credential backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl CredentialError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
