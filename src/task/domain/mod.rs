//! Domain model for tasks, projects, and delivered pull requests.
//!
//! Records are plain aggregates with clock-stamped mutations; persistence,
//! text generation, and hosting-service access stay outside this boundary.

mod branch;
mod error;
mod ids;
mod project;
mod pull_request;
mod task;

pub use branch::{BRANCH_PREFIX, BranchNamer, MAX_SLUG_LEN, slugify};
pub use error::{ParseTaskPriorityError, ParseTaskStateError, TaskDomainError};
pub use ids::{ProjectId, PullRequestId, TaskId, UserId};
pub use project::{Project, ProjectFile, ProjectSource, ProjectStatus};
pub use pull_request::{
    PullRequestDraft, PullRequestRecord, PullRequestStatus, RemoteReference,
};
pub use task::{Task, TaskPriority, TaskState};
