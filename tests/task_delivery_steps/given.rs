//! Given steps for task delivery BDD scenarios.

use super::world::{TaskDeliveryWorld, run_async};
use devpilot::change_set::domain::FilePath;
use devpilot::task::{
    domain::{Project, ProjectFile, ProjectSource, Task},
    ports::{ProjectRepository, TaskRepository},
};
use devpilot::vcs::{
    adapters::memory::HostOperation,
    domain::{BranchName, RepositoryFullName},
    ports::VcsHostError,
};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::given;

fn store_project(world: &mut TaskDeliveryWorld, project: Project) -> Result<(), eyre::Report> {
    run_async(ProjectRepository::store(&*world.store, &project)).wrap_err("store project")?;
    world.project = Some(project);
    Ok(())
}

#[given(r#"a hosted repository "{repository}" with default branch "{branch}""#)]
fn hosted_repository(
    world: &mut TaskDeliveryWorld,
    repository: String,
    branch: String,
) -> Result<(), eyre::Report> {
    world
        .host
        .seed_repository(
            RepositoryFullName::new(repository)?,
            BranchName::new(branch)?,
            &[(FilePath::new("README.md")?, "# app".to_owned())],
        )
        .wrap_err("seed hosted repository")?;
    Ok(())
}

#[given(r#"a remote project for "{repository}""#)]
fn remote_project(world: &mut TaskDeliveryWorld, repository: String) -> Result<(), eyre::Report> {
    let source = ProjectSource::remote(RepositoryFullName::new(repository)?);
    let project = Project::new(world.owner, "app", source, &DefaultClock)?
        .with_tech_stack(["Python"]);
    store_project(world, project)
}

#[given(r#"a local project holding file "{path}" with content "{content}""#)]
fn local_project(
    world: &mut TaskDeliveryWorld,
    path: String,
    content: String,
) -> Result<(), eyre::Report> {
    let source = ProjectSource::local(vec![ProjectFile::new(FilePath::new(path)?, content)]);
    let project = Project::new(world.owner, "scratchpad", source, &DefaultClock)?;
    store_project(world, project)
}

#[given(r#"a task titled "{title}""#)]
fn task_titled(world: &mut TaskDeliveryWorld, title: String) -> Result<(), eyre::Report> {
    let project_id = world.project()?.id();
    let task = Task::new(project_id, world.owner, title, &DefaultClock)?;
    run_async(TaskRepository::store(&*world.store, &task)).wrap_err("store task")?;
    world.task = Some(task);
    Ok(())
}

#[given(r#"the generator proposes file "{path}" containing "{content}""#)]
fn generator_proposes_file(world: &mut TaskDeliveryWorld, path: String, content: String) {
    world
        .reply
        .push_str(&format!("```{path}\n{content}\n```\n\n"));
}

#[given("the generator replies with prose only")]
fn generator_replies_with_prose(world: &mut TaskDeliveryWorld) {
    "The requested behaviour already exists; no changes are needed.".clone_into(&mut world.reply);
}

#[given(r#"the host rejects uploads of "{content}""#)]
fn host_rejects_uploads(world: &mut TaskDeliveryWorld, content: String) -> Result<(), eyre::Report> {
    world.host.reject_blob(content).wrap_err("inject blob rejection")?;
    Ok(())
}

#[given("the host refuses to create branches")]
fn host_refuses_branches(world: &mut TaskDeliveryWorld) -> Result<(), eyre::Report> {
    world
        .host
        .fail_operation(
            HostOperation::CreateRef,
            VcsHostError::Rejected {
                status: 403,
                message: "Resource not accessible by integration".to_owned(),
            },
        )
        .wrap_err("inject branch failure")?;
    Ok(())
}
