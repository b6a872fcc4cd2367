//! Shared builders for VCS tests.

use crate::change_set::domain::{ChangeSet, FileChange, FilePath};
use crate::vcs::{
    adapters::InMemoryVcsHost,
    domain::{AccessToken, BranchName, ObjectSha, RepositoryFullName},
};
use std::sync::Arc;

pub(super) fn repository() -> RepositoryFullName {
    RepositoryFullName::new("octo/app").expect("valid repository")
}

pub(super) fn branch(name: &str) -> BranchName {
    BranchName::new(name).expect("valid branch")
}

pub(super) fn path(raw: &str) -> FilePath {
    FilePath::new(raw).expect("valid path")
}

pub(super) fn token() -> AccessToken {
    AccessToken::new("test-token")
}

pub(super) fn changes(files: &[(&str, &str)]) -> ChangeSet {
    files
        .iter()
        .map(|(file, content)| FileChange::new(path(file), content))
        .collect()
}

/// A host holding `octo/app` with `README.md` on `main`.
pub(super) struct SeededHost {
    pub host: Arc<InMemoryVcsHost>,
    pub base_commit: ObjectSha,
}

pub(super) fn seeded_host() -> SeededHost {
    let host = Arc::new(InMemoryVcsHost::new());
    let base_commit = host
        .seed_repository(
            repository(),
            branch("main"),
            &[(path("README.md"), "# app".to_owned())],
        )
        .expect("seed repository");
    SeededHost { host, base_commit }
}
