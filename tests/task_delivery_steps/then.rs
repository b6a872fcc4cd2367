//! Then steps for task delivery BDD scenarios.

use super::world::{TaskDeliveryWorld, run_async};
use devpilot::task::{
    domain::{PullRequestRecord, TaskState},
    ports::{ProjectRepository, TaskRepository},
    services::TaskDeliveryError,
};
use devpilot::vcs::domain::{PullRequestNumber, RepositoryFullName};
use rstest_bdd_macros::then;

fn pull_request(world: &TaskDeliveryWorld) -> Result<&PullRequestRecord, eyre::Report> {
    world
        .report()?
        .pull_request()
        .ok_or_else(|| eyre::eyre!("run recorded no pull request"))
}

#[then(r#"the task state is "{state}""#)]
fn task_state_is(world: &TaskDeliveryWorld, state: String) -> Result<(), eyre::Report> {
    let expected = TaskState::try_from(state.as_str())
        .map_err(|err| eyre::eyre!("invalid expected state in scenario: {err}"))?;
    let task_id = world.task()?.id();
    let stored = run_async(TaskRepository::find_by_id(&*world.store, task_id))?
        .ok_or_else(|| eyre::eyre!("task {task_id} missing from store"))?;

    if stored.state() != expected {
        return Err(eyre::eyre!(
            "expected state {expected}, found {}",
            stored.state()
        ));
    }
    Ok(())
}

#[then(r#"a pull request numbered {number:u64} targets "{base}""#)]
fn pull_request_targets(
    world: &TaskDeliveryWorld,
    number: u64,
    base: String,
) -> Result<(), eyre::Report> {
    let record = pull_request(world)?;
    let actual = record.number().map(|value| value.value());
    if actual != Some(number) {
        return Err(eyre::eyre!("expected pull request #{number}, found {actual:?}"));
    }
    if record.base_branch().as_str() != base {
        return Err(eyre::eyre!(
            "expected base {base}, found {}",
            record.base_branch()
        ));
    }
    Ok(())
}

#[then(r#"the pull request branch holds file "{path}" with content "{content}""#)]
fn branch_holds_file(
    world: &TaskDeliveryWorld,
    path: String,
    content: String,
) -> Result<(), eyre::Report> {
    let record = pull_request(world)?;
    let repository = world
        .project()?
        .repository()
        .cloned()
        .ok_or_else(|| eyre::eyre!("project has no repository"))?;
    let files = world
        .host
        .branch_files(&repository, record.source_branch())?
        .ok_or_else(|| eyre::eyre!("branch {} missing on host", record.source_branch()))?;

    match files.get(&path) {
        Some(actual) if *actual == content => Ok(()),
        other => Err(eyre::eyre!("expected {path} to hold {content:?}, found {other:?}")),
    }
}

#[then(r#"the pull request skipped file "{path}""#)]
fn pull_request_skipped(world: &TaskDeliveryWorld, path: String) -> Result<(), eyre::Report> {
    let report = world.report()?;
    if !report.skipped().iter().any(|file| file.path.as_str() == path) {
        return Err(eyre::eyre!("{path} was not skipped: {:?}", report.skipped()));
    }
    Ok(())
}

#[then("no pull request was recorded")]
fn no_pull_request(world: &TaskDeliveryWorld) -> Result<(), eyre::Report> {
    let report = world.report()?;
    if let Some(record) = report.pull_request() {
        return Err(eyre::eyre!("unexpected pull request {}", record.id()));
    }
    let repository = RepositoryFullName::new("octo/app")?;
    if world
        .host
        .pull_request(&repository, PullRequestNumber::new(1)?)?
        .is_some()
    {
        return Err(eyre::eyre!("host holds an unexpected pull request"));
    }
    Ok(())
}

#[then(r#"the project holds file "{path}" with content "{content}""#)]
fn project_holds_file(
    world: &TaskDeliveryWorld,
    path: String,
    content: String,
) -> Result<(), eyre::Report> {
    let project_id = world.project()?.id();
    let stored = run_async(ProjectRepository::find_by_id(&*world.store, project_id))?
        .ok_or_else(|| eyre::eyre!("project {project_id} missing from store"))?;
    let file = stored
        .files()
        .iter()
        .find(|file| file.path().as_str() == path)
        .ok_or_else(|| eyre::eyre!("project has no file {path}"))?;

    if file.content() != content || file.size() != content.len() {
        return Err(eyre::eyre!(
            "expected {path} to hold {content:?}, found {:?}",
            file.content()
        ));
    }
    Ok(())
}

#[then(r#"the run failed at step "{step}""#)]
fn run_failed_at_step(world: &TaskDeliveryWorld, step: String) -> Result<(), eyre::Report> {
    match world.outcome.as_ref() {
        Some(Err(TaskDeliveryError::Delivery(failure))) if failure.step().as_str() == step => Ok(()),
        other => Err(eyre::eyre!("expected failure at {step}, got {other:?}")),
    }
}
