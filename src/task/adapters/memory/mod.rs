//! In-memory adapters for tests and single-process deployments.

mod credentials;
mod store;

pub use credentials::StaticCredentialProvider;
pub use store::InMemoryDocumentStore;
