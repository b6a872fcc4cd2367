//! Delivery orchestration over the hosting-service port.

mod delivery;
mod orchestrator;

pub use delivery::{
    DeliveryFailure, DeliveryFailureReason, DeliveryReceipt, DeliveryRequest, SkippedFile,
};
pub use orchestrator::RepositoryCommitOrchestrator;
