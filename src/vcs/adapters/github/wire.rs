//! JSON payloads of the GitHub REST API.

use crate::vcs::domain::{ContentKind, FileStatus, ObjectSha, TreeEntry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ShaOnly {
    pub sha: ObjectSha,
}

#[derive(Debug, Deserialize)]
pub(super) struct RefBody {
    pub object: ShaOnly,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    pub reference: String,
    pub sha: &'a ObjectSha,
}

#[derive(Debug, Serialize)]
pub(super) struct UpdateRefBody<'a> {
    pub sha: &'a ObjectSha,
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommitBody {
    pub sha: ObjectSha,
    pub tree: ShaOnly,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateBlobBody<'a> {
    pub content: &'a str,
    pub encoding: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct TreeItem<'a> {
    pub path: &'a str,
    pub mode: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub sha: Option<&'a ObjectSha>,
}

impl<'a> From<&'a TreeEntry> for TreeItem<'a> {
    fn from(entry: &'a TreeEntry) -> Self {
        Self {
            path: entry.path.as_str(),
            mode: &entry.mode,
            kind: "blob",
            sha: entry.sha.as_ref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CreateTreeBody<'a> {
    pub base_tree: &'a ObjectSha,
    pub tree: Vec<TreeItem<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateCommitBody<'a> {
    pub message: &'a str,
    pub tree: &'a ObjectSha,
    pub parents: &'a [ObjectSha],
}

#[derive(Debug, Serialize)]
pub(super) struct CreatePullBody<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub head: &'a str,
    pub base: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct PullBody {
    pub number: u64,
    pub html_url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct MergeBody {
    pub merge_method: &'static str,
}

#[derive(Debug, Deserialize)]
pub(super) struct MergeResultBody {
    pub sha: Option<ObjectSha>,
    pub merged: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct PullFileBody {
    pub filename: String,
    pub status: FileStatus,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct RepositoryBody {
    pub full_name: String,
    pub default_branch: String,
    #[serde(default)]
    pub private: bool,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ContentEntryBody {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
}

#[derive(Debug, Deserialize)]
pub(super) struct FileBody {
    pub sha: ObjectSha,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PutFileBody<'a> {
    pub message: &'a str,
    pub content: String,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a ObjectSha>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PutFileResult {
    pub commit: ShaOnly,
}
