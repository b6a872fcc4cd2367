//! Validation tests for VCS value objects and protocol vocabulary.

use crate::change_set::domain::FilePath;
use crate::vcs::domain::{
    AccessToken, BranchName, CommitPlan, ObjectSha, ProtocolState, ProtocolStep,
    PullRequestNumber, RepositoryFullName, VcsDomainError,
};
use rstest::rstest;

#[rstest]
#[case("octo/app", "octo", "app")]
#[case("  octo/app  ", "octo", "app")]
fn repository_name_splits_owner_and_name(
    #[case] raw: &str,
    #[case] owner: &str,
    #[case] name: &str,
) {
    let repository = RepositoryFullName::new(raw).expect("valid repository");
    assert_eq!(repository.owner(), owner);
    assert_eq!(repository.name(), name);
    assert_eq!(repository.as_str(), format!("{owner}/{name}"));
}

#[rstest]
#[case("octo")]
#[case("octo/")]
#[case("/app")]
#[case("octo/app/extra")]
#[case("octo /app")]
fn repository_name_rejects_malformed_values(#[case] raw: &str) {
    assert_eq!(
        RepositoryFullName::new(raw),
        Err(VcsDomainError::InvalidRepository(raw.to_owned()))
    );
}

#[rstest]
#[case("feature/add-login-202601151030")]
#[case("main")]
#[case("release-1.2")]
fn branch_name_accepts_git_ref_names(#[case] raw: &str) {
    let branch = BranchName::new(raw).expect("valid branch");
    assert_eq!(branch.as_str(), raw);
    assert_eq!(branch.qualified(), format!("refs/heads/{raw}"));
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("feature:x")]
#[case("has space")]
#[case("a..b")]
#[case("feature/")]
#[case("/feature")]
#[case("topic.lock")]
#[case("what?")]
fn branch_name_rejects_forbidden_refs(#[case] raw: &str) {
    assert!(matches!(
        BranchName::new(raw),
        Err(VcsDomainError::InvalidBranchName(_))
    ));
}

#[test]
fn pull_request_number_must_be_positive() {
    assert_eq!(
        PullRequestNumber::new(0),
        Err(VcsDomainError::InvalidPullRequestNumber(0))
    );
    assert_eq!(PullRequestNumber::new(7).map(PullRequestNumber::value), Ok(7));
}

#[test]
fn object_sha_is_lowercased_and_abbreviates() {
    let sha = ObjectSha::new("ABCDEF0123456789").expect("valid sha");
    assert_eq!(sha.as_str(), "abcdef0123456789");
    assert_eq!(sha.short(), "abcdef0");
}

#[rstest]
#[case("")]
#[case("xyz")]
#[case("abc 123")]
fn object_sha_rejects_non_hex(#[case] raw: &str) {
    assert!(matches!(
        ObjectSha::new(raw),
        Err(VcsDomainError::InvalidObjectSha(_))
    ));
}

#[test]
fn access_token_debug_output_is_redacted() {
    let token = AccessToken::new("ghp_secret");
    assert_eq!(format!("{token:?}"), "AccessToken([REDACTED])");
    assert_eq!(token.expose(), "ghp_secret");
}

#[test]
fn every_step_completes_into_the_state_that_schedules_its_successor() {
    let mut state = ProtocolState::Started;
    for step in ProtocolStep::ALL {
        assert_eq!(state.next_step(), Some(step));
        state = step.completes();
    }
    assert_eq!(state, ProtocolState::PullRequestOpened);
    assert_eq!(state.next_step(), None);
}

#[test]
fn commit_plan_overlays_uploads_and_removals() {
    let mut plan = CommitPlan::new(ObjectSha::new("aaaa").expect("valid sha"));
    assert!(plan.is_empty());

    let added = FilePath::new("src/a.py").expect("valid path");
    let removed = FilePath::new("old.py").expect("valid path");
    plan.add_blob(added.clone(), ObjectSha::new("bbbb").expect("valid sha"));
    plan.remove(removed.clone());

    let entries = plan.tree_entries();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().any(|entry| entry.path == added && entry.sha.is_some()));
    assert!(entries.iter().any(|entry| entry.path == removed && entry.sha.is_none()));
    assert!(entries.iter().all(|entry| entry.mode == "100644"));
}
