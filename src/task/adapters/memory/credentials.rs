//! Fixed user-to-token table.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::task::{
    domain::UserId,
    ports::{CredentialError, CredentialProvider, CredentialResult},
};
use crate::vcs::domain::AccessToken;

/// Credential provider backed by a table built up front.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    tokens: HashMap<UserId, AccessToken>,
}

impl StaticCredentialProvider {
    /// Creates a provider with no tokens.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` for `user`, replacing any previous token.
    #[must_use]
    pub fn with_token(mut self, user: UserId, token: AccessToken) -> Self {
        self.tokens.insert(user, token);
        self
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn token_for(&self, user: UserId) -> CredentialResult<AccessToken> {
        self.tokens
            .get(&user)
            .cloned()
            .ok_or(CredentialError::Missing(user))
    }
}
