//! Adapter implementations for task delivery ports.

pub mod chat;
pub mod memory;

pub use chat::ChatCompletionsGenerator;
pub use memory::{InMemoryDocumentStore, StaticCredentialProvider};
