//! Shared world state for task delivery BDD scenarios.

use std::sync::Arc;

use async_trait::async_trait;
use devpilot::task::{
    adapters::memory::{InMemoryDocumentStore, StaticCredentialProvider},
    domain::{Project, Task, UserId},
    ports::{GenerationRequest, GenerationResult, TextGenerator},
    services::{TaskDeliveryReport, TaskDeliveryResult},
};
use devpilot::telemetry::init_tracing;
use devpilot::vcs::{adapters::InMemoryVcsHost, domain::AccessToken};
use rstest::fixture;
use tracing::Level;

/// Generator answering every request with a fixed reply.
pub struct CannedGenerator {
    reply: String,
}

impl CannedGenerator {
    /// Creates a generator that always returns `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> GenerationResult<String> {
        Ok(self.reply.clone())
    }
}

/// Scenario world for task delivery behaviour tests.
pub struct TaskDeliveryWorld {
    pub store: Arc<InMemoryDocumentStore>,
    pub host: Arc<InMemoryVcsHost>,
    pub credentials: Arc<StaticCredentialProvider>,
    pub owner: UserId,
    pub reply: String,
    pub project: Option<Project>,
    pub task: Option<Task>,
    pub outcome: Option<TaskDeliveryResult<TaskDeliveryReport>>,
}

impl TaskDeliveryWorld {
    /// Creates a world whose owner holds a hosting token.
    #[must_use]
    pub fn new() -> Self {
        let owner = UserId::new();
        Self {
            store: Arc::new(InMemoryDocumentStore::new()),
            host: Arc::new(InMemoryVcsHost::new()),
            credentials: Arc::new(
                StaticCredentialProvider::new().with_token(owner, AccessToken::new("bdd-token")),
            ),
            owner,
            reply: String::new(),
            project: None,
            task: None,
            outcome: None,
        }
    }

    /// Returns the project created by a given step.
    pub fn project(&self) -> Result<&Project, eyre::Report> {
        self.project
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing project in scenario world"))
    }

    /// Returns the task created by a given step.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Returns the successful run report.
    pub fn report(&self) -> Result<&TaskDeliveryReport, eyre::Report> {
        match self.outcome.as_ref() {
            Some(Ok(report)) => Ok(report),
            Some(Err(err)) => Err(eyre::eyre!("task run failed: {err}")),
            None => Err(eyre::eyre!("task has not been run")),
        }
    }
}

impl Default for TaskDeliveryWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskDeliveryWorld {
    let _installed = init_tracing(false, Level::DEBUG);
    TaskDeliveryWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
