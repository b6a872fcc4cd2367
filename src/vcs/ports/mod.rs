//! Port contracts for repository hosting services.

mod host;

pub use host::{VcsHost, VcsHostError, VcsHostResult};
