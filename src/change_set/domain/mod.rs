//! Domain model for file edits proposed by a text-generation run.

mod change;
mod error;
mod path;

pub use change::{ChangeSet, FileAction, FileChange};
pub use error::ChangeSetError;
pub use path::FilePath;
