//! OpenAI-compatible chat-completions adapter for the [`TextGenerator`] port.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::GenerationConfig;
use crate::task::ports::{GenerationError, GenerationRequest, GenerationResult, TextGenerator};
use crate::vcs::domain::AccessToken;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    user: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Text generator posting system and user messages to a chat-completions
/// endpoint and returning the first choice's content.
#[derive(Debug, Clone)]
pub struct ChatCompletionsGenerator {
    client: Client,
    api_url: String,
    model: String,
    api_key: Option<AccessToken>,
    timeout: Duration,
}

impl ChatCompletionsGenerator {
    /// Builds a generator from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Transport`] when the HTTP client cannot be
    /// initialized.
    pub fn new(config: &GenerationConfig) -> GenerationResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(GenerationError::transport)?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout(),
        })
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsGenerator {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: request.user_prompt(),
                },
            ],
            user: request.session_id(),
        };

        debug!(session = request.session_id(), model = %self.model, "requesting completion");
        let mut call = self
            .client
            .post(&self.api_url)
            .timeout(self.timeout)
            .json(&body);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key.expose());
        }

        let response = call.send().await.map_err(GenerationError::transport)?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            return Err(GenerationError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatResponse = response.json().await.map_err(GenerationError::transport)?;
        first_content(completion)
    }
}

fn first_content(completion: ChatResponse) -> GenerationResult<String> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)
}
