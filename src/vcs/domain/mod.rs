//! Domain model for repository commit delivery.
//!
//! Value objects identify repositories, branches, and Git objects. The
//! protocol vocabulary names each remote step and the milestone it reaches,
//! so partial failures can be reported precisely.

mod credentials;
mod error;
mod objects;
mod protocol;
mod refs;
mod remote;

pub use credentials::AccessToken;
pub use error::VcsDomainError;
pub use objects::{
    Branch, CommitInfo, CommitPlan, NewCommit, REGULAR_FILE_MODE, TreeEntry, UploadedBlob,
};
pub use protocol::{ProtocolState, ProtocolStep};
pub use refs::{BranchName, ObjectSha, PullRequestNumber, RepositoryFullName};
pub use remote::{
    ContentEntry, ContentKind, FileStatus, FileWrite, MergeMethod, MergeOutcome, NewPullRequest,
    PullRequestFile, RemoteFile, RemotePullRequest, RepositoryMetadata,
};
