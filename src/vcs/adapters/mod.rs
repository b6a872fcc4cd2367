//! Adapter implementations for the hosting-service port.

pub mod github;
pub mod memory;

pub use github::GitHubHost;
pub use memory::InMemoryVcsHost;
