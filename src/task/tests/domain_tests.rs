//! Domain tests for task, project, and pull-request records.

use super::fixtures::{FixedClock, branch, local_project, owner, path, remote_project, task_for};
use crate::change_set::domain::{ChangeSet, FileAction, FileChange};
use crate::task::domain::{
    Project, ProjectSource, ProjectStatus, PullRequestDraft, PullRequestRecord,
    PullRequestStatus, Task, TaskDomainError, TaskPriority, TaskState,
};
use crate::vcs::domain::{PullRequestNumber, RemotePullRequest};
use rstest::rstest;

fn draft(project: &Project, task: &Task) -> PullRequestDraft {
    PullRequestDraft {
        project_id: project.id(),
        task_id: task.id(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        source_branch: branch("feature/add-login-202603140926"),
        base_branch: branch("main"),
        files: [FileChange::new(path("a.py"), "print(1)")].into_iter().collect(),
    }
}

#[rstest]
fn new_task_is_pending_with_medium_priority() {
    let project = remote_project();
    let task = task_for(&project, "  Add login  ");

    assert_eq!(task.state(), TaskState::Pending);
    assert_eq!(task.priority(), TaskPriority::Medium);
    assert_eq!(task.title(), "Add login");
    assert_eq!(task.project_id(), project.id());
    assert_eq!(task.owner(), owner());
    assert_eq!(task.response(), None);
    assert_eq!(task.pull_request(), None);
    assert_eq!(task.created_at(), FixedClock::instant());
}

#[rstest]
#[case("")]
#[case("   ")]
fn blank_task_title_is_rejected(#[case] title: &str) {
    let project = remote_project();
    let result = Task::new(project.id(), owner(), title, &FixedClock);
    assert_eq!(result, Err(TaskDomainError::EmptyTaskTitle));
}

#[rstest]
fn blank_project_name_is_rejected() {
    let result = Project::new(owner(), " ", ProjectSource::local(Vec::new()), &FixedClock);
    assert_eq!(result, Err(TaskDomainError::EmptyProjectName));
}

#[rstest]
#[case(TaskState::Pending, TaskState::InProgress, true)]
#[case(TaskState::Completed, TaskState::InProgress, true)]
#[case(TaskState::Failed, TaskState::InProgress, true)]
#[case(TaskState::InProgress, TaskState::InProgress, true)]
#[case(TaskState::InProgress, TaskState::Completed, true)]
#[case(TaskState::InProgress, TaskState::Failed, true)]
#[case(TaskState::Pending, TaskState::Completed, false)]
#[case(TaskState::Pending, TaskState::Failed, false)]
#[case(TaskState::Completed, TaskState::Failed, false)]
#[case(TaskState::Failed, TaskState::Completed, false)]
#[case(TaskState::InProgress, TaskState::Pending, false)]
fn state_transition_table(#[case] from: TaskState, #[case] to: TaskState, #[case] allowed: bool) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[rstest]
fn completing_a_pending_task_is_rejected() {
    let project = remote_project();
    let mut task = task_for(&project, "Add login");

    let result = task.complete(&FixedClock);

    assert_eq!(
        result,
        Err(TaskDomainError::InvalidStateTransition {
            task: task.id(),
            from: TaskState::Pending,
            to: TaskState::Completed,
        })
    );
    assert_eq!(task.state(), TaskState::Pending);
}

#[rstest]
fn restarting_discards_the_previous_response() {
    let project = remote_project();
    let mut task = task_for(&project, "Add login");
    task.start(&FixedClock);
    task.record_response("first attempt", &FixedClock);
    task.fail(&FixedClock).expect("running task can fail");

    task.start(&FixedClock);

    assert_eq!(task.state(), TaskState::InProgress);
    assert_eq!(task.response(), None);
}

#[rstest]
#[case("pending", TaskState::Pending)]
#[case("IN_PROGRESS", TaskState::InProgress)]
#[case(" completed ", TaskState::Completed)]
#[case("failed", TaskState::Failed)]
fn task_state_parses_storage_form(#[case] raw: &str, #[case] expected: TaskState) {
    assert_eq!(TaskState::try_from(raw), Ok(expected));
}

#[rstest]
fn unknown_priority_is_rejected() {
    assert!(TaskPriority::try_from("urgent").is_err());
    assert_eq!(TaskPriority::try_from("high"), Ok(TaskPriority::High));
}

#[rstest]
fn merging_upserts_files_in_change_set_order() {
    let mut project = local_project();
    let changes: ChangeSet = [
        FileChange::new(path("app.py"), "print('v2')").with_action(FileAction::Modify),
        FileChange::new(path("lib/util.py"), "def helper():\n    pass"),
    ]
    .into_iter()
    .collect();

    let touched = project
        .merge_change_set(&changes, &FixedClock)
        .expect("local project accepts changes");

    assert_eq!(touched, 2);
    let files: Vec<(&str, &str, usize)> = project
        .files()
        .iter()
        .map(|file| (file.path().as_str(), file.content(), file.size()))
        .collect();
    assert_eq!(
        files,
        vec![
            ("app.py", "print('v2')", 11),
            ("README.md", "# scratchpad", 12),
            ("lib/util.py", "def helper():\n    pass", 22),
        ]
    );
}

#[rstest]
fn merging_a_delete_removes_the_file() {
    let mut project = local_project();
    let changes: ChangeSet = [
        FileChange::new(path("README.md"), "").with_action(FileAction::Delete),
        FileChange::new(path("missing.txt"), "").with_action(FileAction::Delete),
    ]
    .into_iter()
    .collect();

    let touched = project
        .merge_change_set(&changes, &FixedClock)
        .expect("local project accepts changes");

    assert_eq!(touched, 1);
    let paths: Vec<&str> = project.files().iter().map(|file| file.path().as_str()).collect();
    assert_eq!(paths, vec!["app.py"]);
}

#[rstest]
fn merging_into_a_remote_project_is_rejected() {
    let mut project = remote_project();
    let changes: ChangeSet = [FileChange::new(path("a.py"), "x")].into_iter().collect();

    let result = project.merge_change_set(&changes, &FixedClock);

    assert_eq!(result, Err(TaskDomainError::NotLocalProject(project.id())));
}

#[rstest]
fn analysis_lifecycle_moves_through_statuses() {
    let mut project = remote_project();
    assert_eq!(project.status(), ProjectStatus::Analyzing);

    project.record_summary("A Flask shop.", &FixedClock);
    assert_eq!(project.status(), ProjectStatus::Ready);
    assert_eq!(project.summary(), Some("A Flask shop."));

    project.begin_analysis(&FixedClock);
    project.mark_analysis_failed(&FixedClock);
    assert_eq!(project.status(), ProjectStatus::Error);
    assert_eq!(project.summary(), Some("A Flask shop."), "failure keeps the last summary");
}

#[rstest]
fn remembered_default_branch_is_reported() {
    let mut project = remote_project();
    assert_eq!(project.default_branch(), None);

    project.remember_default_branch(branch("trunk"), &FixedClock);

    assert_eq!(project.default_branch(), Some(&branch("trunk")));
}

#[rstest]
fn local_record_has_no_remote_reference() {
    let project = local_project();
    let task = task_for(&project, "Add login");

    let record = PullRequestRecord::local(draft(&project, &task), &FixedClock);

    assert_eq!(record.status(), PullRequestStatus::Open);
    assert_eq!(record.number(), None);
    assert!(record.remote_reference().is_none());
    assert_eq!(record.files().len(), 1);
}

#[rstest]
fn remote_record_keeps_number_and_url() {
    let project = remote_project();
    let task = task_for(&project, "Add login");
    let remote = RemotePullRequest {
        number: PullRequestNumber::new(7).expect("valid number"),
        url: "https://github.com/octo/app/pull/7".to_owned(),
    };

    let record = PullRequestRecord::remote(draft(&project, &task), remote, &FixedClock);

    assert_eq!(record.number().map(PullRequestNumber::value), Some(7));
    assert_eq!(
        record.remote_reference().map(|reference| reference.url()),
        Some("https://github.com/octo/app/pull/7")
    );
    assert_eq!(record.task_id(), task.id());
}

#[rstest]
fn settled_record_rejects_further_review_actions() {
    let project = local_project();
    let task = task_for(&project, "Add login");
    let mut record = PullRequestRecord::local(draft(&project, &task), &FixedClock);

    record.mark_merged(&FixedClock).expect("open record merges");

    assert_eq!(record.status(), PullRequestStatus::Merged);
    assert_eq!(
        record.close(&FixedClock),
        Err(TaskDomainError::PullRequestNotOpen {
            pull_request: record.id(),
            status: PullRequestStatus::Merged,
        })
    );
}
