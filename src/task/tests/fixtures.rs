//! Shared builders and doubles for task tests.

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;

use crate::change_set::domain::FilePath;
use crate::task::{
    adapters::memory::{InMemoryDocumentStore, StaticCredentialProvider},
    domain::{Project, ProjectFile, ProjectSource, Task, UserId},
    ports::{
        CredentialProvider, CredentialResult, GenerationRequest, GenerationResult, TextGenerator,
    },
};
use crate::vcs::{
    adapters::InMemoryVcsHost,
    domain::{AccessToken, BranchName, RepositoryFullName},
    services::RepositoryCommitOrchestrator,
};

/// Minute stamp [`FixedClock`] produces in branch names.
pub(super) const STAMP: &str = "202603140926";

/// Clock frozen at 2026-03-14 09:26:53 UTC.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct FixedClock;

impl FixedClock {
    pub(super) fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53)
            .single()
            .expect("valid instant")
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        Self::instant().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Self::instant()
    }
}

mockall::mock! {
    pub Generator {}

    #[async_trait]
    impl TextGenerator for Generator {
        async fn generate(&self, request: &GenerationRequest) -> GenerationResult<String>;
    }
}

mockall::mock! {
    pub Credentials {}

    #[async_trait]
    impl CredentialProvider for Credentials {
        async fn token_for(&self, user: UserId) -> CredentialResult<AccessToken>;
    }
}

/// Generator answering every request with the same text.
pub(super) fn replying(text: &'static str) -> MockGenerator {
    let mut generator = MockGenerator::new();
    generator
        .expect_generate()
        .returning(move |_| Ok(text.to_owned()));
    generator
}

pub(super) fn repository() -> RepositoryFullName {
    RepositoryFullName::new("octo/app").expect("valid repository")
}

pub(super) fn branch(name: &str) -> BranchName {
    BranchName::new(name).expect("valid branch")
}

pub(super) fn path(raw: &str) -> FilePath {
    FilePath::new(raw).expect("valid path")
}

pub(super) fn owner() -> UserId {
    UserId::from_uuid(uuid::Uuid::from_u128(0x0A11_CE00))
}

pub(super) fn remote_project() -> Project {
    Project::new(
        owner(),
        "storefront",
        ProjectSource::remote(repository()),
        &FixedClock,
    )
    .expect("valid project")
    .with_description("Online shop")
    .with_tech_stack(["Python", "Flask"])
}

pub(super) fn local_project() -> Project {
    Project::new(
        owner(),
        "scratchpad",
        ProjectSource::local(vec![
            ProjectFile::new(path("app.py"), "print('v1')"),
            ProjectFile::new(path("README.md"), "# scratchpad"),
        ]),
        &FixedClock,
    )
    .expect("valid project")
}

pub(super) fn task_for(project: &Project, title: &str) -> Task {
    Task::new(project.id(), owner(), title, &FixedClock)
        .expect("valid task")
        .with_description("Make it work")
}

/// Response proposing two files through path-named fences.
pub(super) const TWO_FILE_RESPONSE: &str = concat!(
    "I will add a login view.\n\n",
    "```app/login.py\ndef login():\n    return 'ok'\n```\n\n",
    "```app/templates/login.html\n<form></form>\n```\n",
);

/// Response with prose only.
pub(super) const NO_FILE_RESPONSE: &str = "Nothing needs to change; the feature already exists.";

/// Services wired to in-memory adapters with `octo/app` seeded on `main`.
pub(super) struct Harness {
    pub store: Arc<InMemoryDocumentStore>,
    pub host: Arc<InMemoryVcsHost>,
    pub credentials: Arc<StaticCredentialProvider>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    pub(super) fn new() -> Self {
        let host = Arc::new(InMemoryVcsHost::new());
        host.seed_repository(
            repository(),
            branch("main"),
            &[
                (path("README.md"), "# storefront".to_owned()),
                (path("app/__init__.py"), String::new()),
            ],
        )
        .expect("seed repository");
        Self {
            store: Arc::new(InMemoryDocumentStore::new()),
            host,
            credentials: Arc::new(
                StaticCredentialProvider::new().with_token(owner(), AccessToken::new("gh-token")),
            ),
            clock: Arc::new(FixedClock),
        }
    }

    pub(super) fn orchestrator(&self) -> RepositoryCommitOrchestrator<InMemoryVcsHost> {
        RepositoryCommitOrchestrator::new(Arc::clone(&self.host), Duration::from_secs(5))
    }
}
