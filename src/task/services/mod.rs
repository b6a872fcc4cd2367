//! Application services for task delivery.

mod analysis;
mod delivery;
mod prompt;
mod review;

pub use analysis::{ProjectAnalysisError, ProjectAnalysisResult, ProjectAnalysisService};
pub use delivery::{
    TaskDeliveryError, TaskDeliveryPipeline, TaskDeliveryReport, TaskDeliveryResult,
};
pub use prompt::{
    LISTED_REPOSITORY_FILES, PromptBuilder, PromptRenderError, QUOTED_FILE_CHARS,
    QUOTED_LOCAL_FILES, local_excerpts, repository_listing,
};
pub use review::{PullRequestReviewError, PullRequestReviewResult, PullRequestReviewService};
