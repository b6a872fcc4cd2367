//! When steps for task delivery BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use super::world::{CannedGenerator, TaskDeliveryWorld, run_async};
use devpilot::task::services::TaskDeliveryPipeline;
use devpilot::vcs::services::RepositoryCommitOrchestrator;
use mockable::DefaultClock;
use rstest_bdd_macros::when;

#[when("the task is run")]
fn task_is_run(world: &mut TaskDeliveryWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let pipeline = TaskDeliveryPipeline::new(
        Arc::clone(&world.store),
        Arc::new(CannedGenerator::new(world.reply.clone())),
        Arc::clone(&world.credentials),
        RepositoryCommitOrchestrator::new(Arc::clone(&world.host), Duration::from_secs(5)),
        Arc::new(DefaultClock),
    );
    world.outcome = Some(run_async(pipeline.execute(task_id)));
    Ok(())
}
