//! Text-generation port consumed by delivery and analysis runs.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for text-generation calls.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// One system/user prompt pair sent to a text generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    session_id: String,
    system_prompt: String,
    user_prompt: String,
}

impl GenerationRequest {
    /// Creates a request tagged with a conversation session identifier.
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns the system prompt.
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Returns the user prompt.
    #[must_use]
    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }
}

/// Produces unstructured text for a prompt pair.
///
/// No shape is enforced on the returned text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a reply to `request`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] when the service refuses the request,
    /// returns no text, or cannot be reached.
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult<String>;
}

/// Errors returned by text generators.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The service answered with a non-success status.
    #[error("text generation rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body or summary.
        message: String,
    },

    /// The service answered without any text.
    #[error("text generation returned no content")]
    EmptyResponse,

    /// The request could not be sent or decoded.
    #[error("text generation transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl GenerationError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
