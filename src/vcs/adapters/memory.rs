//! In-memory hosting service for deterministic delivery tests.
//!
//! Objects are content-addressed with SHA-256 digests truncated to Git's
//! forty hexadecimal characters. Trees are flat path-to-blob maps.

use crate::change_set::domain::FilePath;
use crate::vcs::{
    domain::{
        AccessToken, BranchName, CommitInfo, ContentEntry, ContentKind, FileStatus, FileWrite,
        MergeMethod, MergeOutcome, NewCommit, NewPullRequest, ObjectSha, PullRequestFile,
        PullRequestNumber, RemoteFile, RemotePullRequest, RepositoryFullName, RepositoryMetadata,
        TreeEntry,
    },
    ports::{VcsHost, VcsHostError, VcsHostResult},
};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// Length of an abbreviated digest, in bytes.
const OBJECT_ID_BYTES: usize = 20;

/// Host operations recorded by [`InMemoryVcsHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOperation {
    /// [`VcsHost::get_ref`].
    GetRef,
    /// [`VcsHost::create_ref`].
    CreateRef,
    /// [`VcsHost::get_commit`].
    GetCommit,
    /// [`VcsHost::create_blob`].
    CreateBlob,
    /// [`VcsHost::create_tree`].
    CreateTree,
    /// [`VcsHost::create_commit`].
    CreateCommit,
    /// [`VcsHost::update_ref`].
    UpdateRef,
    /// [`VcsHost::create_pull_request`].
    CreatePullRequest,
    /// [`VcsHost::merge_pull_request`].
    MergePullRequest,
    /// [`VcsHost::list_pull_request_files`].
    ListPullRequestFiles,
    /// [`VcsHost::get_repository`].
    GetRepository,
    /// [`VcsHost::list_contents`].
    ListContents,
    /// [`VcsHost::get_file`].
    GetFile,
    /// [`VcsHost::put_file`].
    PutFile,
}

/// Snapshot of a stored commit, for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSnapshot {
    /// Root tree identifier.
    pub tree: ObjectSha,
    /// Parent commit identifiers.
    pub parents: Vec<ObjectSha>,
    /// Commit message.
    pub message: String,
}

/// Snapshot of a stored pull request, for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSnapshot {
    /// Title.
    pub title: String,
    /// Source branch.
    pub head: BranchName,
    /// Target branch.
    pub base: BranchName,
    /// Whether the pull request has been merged.
    pub merged: bool,
}

type Tree = BTreeMap<FilePath, ObjectSha>;

#[derive(Debug, Clone)]
struct StoredPullRequest {
    title: String,
    head: BranchName,
    base: BranchName,
    base_commit: ObjectSha,
    merged: bool,
}

#[derive(Debug)]
struct RepositoryState {
    metadata: RepositoryMetadata,
    refs: HashMap<BranchName, ObjectSha>,
    blobs: HashMap<ObjectSha, String>,
    trees: HashMap<ObjectSha, Tree>,
    commits: HashMap<ObjectSha, CommitSnapshot>,
    pulls: BTreeMap<u64, StoredPullRequest>,
}

#[derive(Debug, Default)]
struct HostState {
    repositories: HashMap<RepositoryFullName, RepositoryState>,
    failures: HashMap<HostOperation, VcsHostError>,
    latencies: HashMap<HostOperation, Duration>,
    rejected_contents: HashSet<String>,
    operations: Vec<HostOperation>,
    sequence: u64,
}

/// In-memory [`VcsHost`] implementation.
///
/// Supports failure injection per operation and per blob content, and
/// records every call in order. Tokens are accepted without checks.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVcsHost {
    state: Arc<RwLock<HostState>>,
}

impl InMemoryVcsHost {
    /// Creates an empty in-memory host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository whose default branch holds `files` in one
    /// commit, returning that commit.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn seed_repository(
        &self,
        repository: RepositoryFullName,
        default_branch: BranchName,
        files: &[(FilePath, String)],
    ) -> VcsHostResult<ObjectSha> {
        let mut state = self.write()?;
        let mut repo = RepositoryState::new(RepositoryMetadata {
            full_name: repository.clone(),
            default_branch: default_branch.clone(),
            private: false,
            description: None,
        });
        let mut tree = Tree::new();
        for (path, content) in files {
            let blob = repo.store_blob(content)?;
            tree.insert(path.clone(), blob);
        }
        let tree_sha = repo.store_tree(tree)?;
        let sequence = state.next_sequence();
        let commit = repo.store_commit(
            CommitSnapshot {
                tree: tree_sha,
                parents: Vec::new(),
                message: "Initial commit".to_owned(),
            },
            sequence,
        )?;
        repo.refs.insert(default_branch, commit.clone());
        state.repositories.insert(repository, repo);
        Ok(commit)
    }

    /// Makes every later call of `operation` fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn fail_operation(
        &self,
        operation: HostOperation,
        error: VcsHostError,
    ) -> VcsHostResult<()> {
        self.write()?.failures.insert(operation, error);
        Ok(())
    }

    /// Delays every later call of `operation` by `latency`.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn delay_operation(
        &self,
        operation: HostOperation,
        latency: Duration,
    ) -> VcsHostResult<()> {
        self.write()?.latencies.insert(operation, latency);
        Ok(())
    }

    /// Clears an injected failure.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn clear_failure(&self, operation: HostOperation) -> VcsHostResult<()> {
        self.write()?.failures.remove(&operation);
        Ok(())
    }

    /// Makes blob uploads of exactly `content` fail.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn reject_blob(&self, content: impl Into<String>) -> VcsHostResult<()> {
        self.write()?.rejected_contents.insert(content.into());
        Ok(())
    }

    /// Returns every recorded call in order.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn operations(&self) -> VcsHostResult<Vec<HostOperation>> {
        Ok(self.read()?.operations.clone())
    }

    /// Returns how many times `operation` was called.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn call_count(&self, operation: HostOperation) -> VcsHostResult<usize> {
        Ok(self
            .read()?
            .operations
            .iter()
            .filter(|recorded| **recorded == operation)
            .count())
    }

    /// Returns the commit a branch points to.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn branch_head(
        &self,
        repository: &RepositoryFullName,
        branch: &BranchName,
    ) -> VcsHostResult<Option<ObjectSha>> {
        Ok(self
            .read()?
            .repositories
            .get(repository)
            .and_then(|repo| repo.refs.get(branch).cloned()))
    }

    /// Returns a stored commit.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn commit(
        &self,
        repository: &RepositoryFullName,
        sha: &ObjectSha,
    ) -> VcsHostResult<Option<CommitSnapshot>> {
        Ok(self
            .read()?
            .repositories
            .get(repository)
            .and_then(|repo| repo.commits.get(sha).cloned()))
    }

    /// Returns the path-to-content map a branch head holds.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn branch_files(
        &self,
        repository: &RepositoryFullName,
        branch: &BranchName,
    ) -> VcsHostResult<Option<BTreeMap<String, String>>> {
        let state = self.read()?;
        let Some(repo) = state.repositories.get(repository) else {
            return Ok(None);
        };
        let files = repo
            .head_tree(branch)
            .ok()
            .map(|tree| repo.materialize(tree));
        Ok(files)
    }

    /// Returns a stored pull request.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn pull_request(
        &self,
        repository: &RepositoryFullName,
        number: PullRequestNumber,
    ) -> VcsHostResult<Option<PullRequestSnapshot>> {
        Ok(self
            .read()?
            .repositories
            .get(repository)
            .and_then(|repo| repo.pulls.get(&number.value()))
            .map(|pull| PullRequestSnapshot {
                title: pull.title.clone(),
                head: pull.head.clone(),
                base: pull.base.clone(),
                merged: pull.merged,
            }))
    }

    fn read(&self) -> VcsHostResult<RwLockReadGuard<'_, HostState>> {
        self.state
            .read()
            .map_err(|err| VcsHostError::transport(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> VcsHostResult<RwLockWriteGuard<'_, HostState>> {
        self.state
            .write()
            .map_err(|err| VcsHostError::transport(std::io::Error::other(err.to_string())))
    }

    /// Applies injected latency, records the call, and applies injected
    /// failures before handing out the state.
    async fn enter(
        &self,
        operation: HostOperation,
    ) -> VcsHostResult<RwLockWriteGuard<'_, HostState>> {
        let latency = self.read()?.latencies.get(&operation).copied();
        if let Some(pause) = latency {
            tokio::time::sleep(pause).await;
        }
        let mut state = self.write()?;
        state.operations.push(operation);
        if let Some(error) = state.failures.get(&operation) {
            return Err(error.clone());
        }
        Ok(state)
    }
}

impl HostState {
    fn repository(&self, name: &RepositoryFullName) -> VcsHostResult<&RepositoryState> {
        self.repositories
            .get(name)
            .ok_or_else(|| VcsHostError::NotFound(format!("repository {name}")))
    }

    fn repository_mut(
        &mut self,
        name: &RepositoryFullName,
    ) -> VcsHostResult<&mut RepositoryState> {
        self.repositories
            .get_mut(name)
            .ok_or_else(|| VcsHostError::NotFound(format!("repository {name}")))
    }

    const fn next_sequence(&mut self) -> u64 {
        self.sequence = self.sequence.wrapping_add(1);
        self.sequence
    }
}

impl RepositoryState {
    fn new(metadata: RepositoryMetadata) -> Self {
        Self {
            metadata,
            refs: HashMap::new(),
            blobs: HashMap::new(),
            trees: HashMap::new(),
            commits: HashMap::new(),
            pulls: BTreeMap::new(),
        }
    }

    fn store_blob(&mut self, content: &str) -> VcsHostResult<ObjectSha> {
        let sha = object_id("blob", content)?;
        self.blobs.insert(sha.clone(), content.to_owned());
        Ok(sha)
    }

    fn store_tree(&mut self, tree: Tree) -> VcsHostResult<ObjectSha> {
        let listing: String = tree
            .iter()
            .map(|(path, blob)| format!("{path} {blob}\n"))
            .collect();
        let sha = object_id("tree", &listing)?;
        self.trees.insert(sha.clone(), tree);
        Ok(sha)
    }

    fn store_commit(&mut self, commit: CommitSnapshot, sequence: u64) -> VcsHostResult<ObjectSha> {
        let parents: Vec<&str> = commit.parents.iter().map(ObjectSha::as_str).collect();
        let payload = format!(
            "tree {}\nparents {}\nsequence {sequence}\n\n{}",
            commit.tree,
            parents.join(" "),
            commit.message
        );
        let sha = object_id("commit", &payload)?;
        self.commits.insert(sha.clone(), commit);
        Ok(sha)
    }

    fn head(&self, branch: &BranchName) -> VcsHostResult<&ObjectSha> {
        self.refs
            .get(branch)
            .ok_or_else(|| VcsHostError::NotFound(format!("branch {branch}")))
    }

    fn commit(&self, sha: &ObjectSha) -> VcsHostResult<&CommitSnapshot> {
        self.commits
            .get(sha)
            .ok_or_else(|| VcsHostError::NotFound(format!("commit {sha}")))
    }

    fn tree(&self, sha: &ObjectSha) -> VcsHostResult<&Tree> {
        self.trees
            .get(sha)
            .ok_or_else(|| VcsHostError::NotFound(format!("tree {sha}")))
    }

    fn head_tree(&self, branch: &BranchName) -> VcsHostResult<&Tree> {
        let commit = self.commit(self.head(branch)?)?;
        self.tree(&commit.tree)
    }

    fn materialize(&self, tree: &Tree) -> BTreeMap<String, String> {
        tree.iter()
            .map(|(path, blob)| {
                let content = self.blobs.get(blob).cloned().unwrap_or_default();
                (path.as_str().to_owned(), content)
            })
            .collect()
    }

    /// Commits `tree` on top of `branch` and moves the branch.
    fn commit_on(
        &mut self,
        branch: &BranchName,
        tree: Tree,
        message: String,
        sequence: u64,
    ) -> VcsHostResult<ObjectSha> {
        let parent = self.head(branch)?.clone();
        let tree_sha = self.store_tree(tree)?;
        let commit = self.store_commit(
            CommitSnapshot {
                tree: tree_sha,
                parents: vec![parent],
                message,
            },
            sequence,
        )?;
        self.refs.insert(branch.clone(), commit.clone());
        Ok(commit)
    }

    fn pull(&self, number: PullRequestNumber) -> VcsHostResult<&StoredPullRequest> {
        self.pulls
            .get(&number.value())
            .ok_or_else(|| VcsHostError::NotFound(format!("pull request #{number}")))
    }
}

fn rejected(status: u16, message: impl Into<String>) -> VcsHostError {
    VcsHostError::Rejected {
        status,
        message: message.into(),
    }
}

fn object_id(kind: &str, payload: &str) -> VcsHostResult<ObjectSha> {
    let mut hasher = Sha256::new();
    hasher.update(format!("{kind} {}\0", payload.len()));
    hasher.update(payload);
    let hex: String = hasher
        .finalize()
        .iter()
        .take(OBJECT_ID_BYTES)
        .flat_map(|byte| [byte >> 4, byte & 0x0f])
        .filter_map(|nibble| char::from_digit(u32::from(nibble), 16))
        .collect();
    ObjectSha::new(hex).map_err(|err| VcsHostError::InvalidResponse(err.to_string()))
}

fn diff_trees(base: &Tree, head: &Tree) -> Vec<PullRequestFile> {
    let paths: BTreeSet<&FilePath> = base.keys().chain(head.keys()).collect();
    paths
        .into_iter()
        .filter_map(|path| {
            let status = match (base.get(path), head.get(path)) {
                (None, Some(_)) => FileStatus::Added,
                (Some(_), None) => FileStatus::Removed,
                (Some(before), Some(after)) if before != after => FileStatus::Modified,
                _ => return None,
            };
            Some(PullRequestFile {
                filename: path.as_str().to_owned(),
                status,
                additions: 0,
                deletions: 0,
            })
        })
        .collect()
}

fn list_directory(tree: &Tree, directory: Option<&FilePath>) -> Vec<ContentEntry> {
    let prefix = directory.map(|dir| format!("{}/", dir.as_str()));
    let mut entries: BTreeMap<String, ContentEntry> = BTreeMap::new();
    for path in tree.keys() {
        let Some(relative) = prefix
            .as_deref()
            .map_or(Some(path.as_str()), |dir| path.as_str().strip_prefix(dir))
        else {
            continue;
        };
        let (name, kind) = relative
            .split_once('/')
            .map_or((relative, ContentKind::File), |(head, _)| {
                (head, ContentKind::Dir)
            });
        let full_path = format!("{}{name}", prefix.as_deref().unwrap_or_default());
        entries.entry(name.to_owned()).or_insert(ContentEntry {
            name: name.to_owned(),
            path: full_path,
            kind,
        });
    }
    entries.into_values().collect()
}

#[async_trait]
impl VcsHost for InMemoryVcsHost {
    async fn get_ref(
        &self,
        _token: &AccessToken,
        repository: &RepositoryFullName,
        branch: &BranchName,
    ) -> VcsHostResult<ObjectSha> {
        let state = self.enter(HostOperation::GetRef).await?;
        state.repository(repository)?.head(branch).cloned()
    }

    async fn create_ref(
        &self,
        _token: &AccessToken,
        repository: &RepositoryFullName,
        branch: &BranchName,
        sha: &ObjectSha,
    ) -> VcsHostResult<()> {
        let mut state = self.enter(HostOperation::CreateRef).await?;
        let repo = state.repository_mut(repository)?;
        if repo.refs.contains_key(branch) {
            return Err(VcsHostError::RefAlreadyExists(branch.clone()));
        }
        if !repo.commits.contains_key(sha) {
            return Err(rejected(422, format!("object {sha} does not exist")));
        }
        repo.refs.insert(branch.clone(), sha.clone());
        Ok(())
    }

    async fn get_commit(
        &self,
        _token: &AccessToken,
        repository: &RepositoryFullName,
        sha: &ObjectSha,
    ) -> VcsHostResult<CommitInfo> {
        let state = self.enter(HostOperation::GetCommit).await?;
        let commit = state.repository(repository)?.commit(sha)?;
        Ok(CommitInfo {
            sha: sha.clone(),
            tree: commit.tree.clone(),
            message: commit.message.clone(),
        })
    }

    async fn create_blob(
        &self,
        _token: &AccessToken,
        repository: &RepositoryFullName,
        content: &str,
    ) -> VcsHostResult<ObjectSha> {
        let mut state = self.enter(HostOperation::CreateBlob).await?;
        if state.rejected_contents.contains(content) {
            return Err(rejected(500, "blob upload rejected"));
        }
        state.repository_mut(repository)?.store_blob(content)
    }

    async fn create_tree(
        &self,
        _token: &AccessToken,
        repository: &RepositoryFullName,
        base_tree: &ObjectSha,
        entries: &[TreeEntry],
    ) -> VcsHostResult<ObjectSha> {
        let mut state = self.enter(HostOperation::CreateTree).await?;
        let repo = state.repository_mut(repository)?;
        let mut tree = repo.tree(base_tree)?.clone();
        for entry in entries {
            match &entry.sha {
                Some(blob) if repo.blobs.contains_key(blob) => {
                    tree.insert(entry.path.clone(), blob.clone());
                }
                Some(blob) => return Err(rejected(422, format!("blob {blob} does not exist"))),
                None => {
                    tree.remove(&entry.path);
                }
            }
        }
        repo.store_tree(tree)
    }

    async fn create_commit(
        &self,
        _token: &AccessToken,
        repository: &RepositoryFullName,
        commit: &NewCommit,
    ) -> VcsHostResult<ObjectSha> {
        let mut state = self.enter(HostOperation::CreateCommit).await?;
        let sequence = state.next_sequence();
        let repo = state.repository_mut(repository)?;
        repo.tree(&commit.tree)?;
        if let Some(missing) = commit
            .parents
            .iter()
            .find(|parent| !repo.commits.contains_key(*parent))
        {
            return Err(rejected(422, format!("parent {missing} does not exist")));
        }
        repo.store_commit(
            CommitSnapshot {
                tree: commit.tree.clone(),
                parents: commit.parents.clone(),
                message: commit.message.clone(),
            },
            sequence,
        )
    }

    async fn update_ref(
        &self,
        _token: &AccessToken,
        repository: &RepositoryFullName,
        branch: &BranchName,
        sha: &ObjectSha,
    ) -> VcsHostResult<()> {
        let mut state = self.enter(HostOperation::UpdateRef).await?;
        let repo = state.repository_mut(repository)?;
        let current = repo.head(branch)?;
        let is_fast_forward = repo.commit(sha)?.parents.contains(current) || current == sha;
        if !is_fast_forward {
            return Err(rejected(422, "update is not a fast forward"));
        }
        repo.refs.insert(branch.clone(), sha.clone());
        Ok(())
    }

    async fn create_pull_request(
        &self,
        _token: &AccessToken,
        repository: &RepositoryFullName,
        request: &NewPullRequest,
    ) -> VcsHostResult<RemotePullRequest> {
        let mut state = self.enter(HostOperation::CreatePullRequest).await?;
        let repo = state.repository_mut(repository)?;
        let base_commit = repo
            .head(&request.base)
            .map_err(|_| rejected(422, format!("base {} does not exist", request.base)))?
            .clone();
        repo.head(&request.head)
            .map_err(|_| rejected(422, format!("head {} does not exist", request.head)))?;

        let number_value = repo.pulls.keys().next_back().map_or(1, |last| last.wrapping_add(1));
        let number =
            PullRequestNumber::new(number_value).map_err(|err| rejected(422, err.to_string()))?;
        repo.pulls.insert(
            number_value,
            StoredPullRequest {
                title: request.title.clone(),
                head: request.head.clone(),
                base: request.base.clone(),
                base_commit,
                merged: false,
            },
        );
        Ok(RemotePullRequest {
            number,
            url: format!("memory://{repository}/pull/{number}"),
        })
    }

    async fn merge_pull_request(
        &self,
        _token: &AccessToken,
        repository: &RepositoryFullName,
        number: PullRequestNumber,
        method: MergeMethod,
    ) -> VcsHostResult<MergeOutcome> {
        let mut state = self.enter(HostOperation::MergePullRequest).await?;
        let sequence = state.next_sequence();
        let repo = state.repository_mut(repository)?;
        let pull = repo.pull(number)?.clone();
        if pull.merged {
            return Err(rejected(405, "pull request is already merged"));
        }

        let head_tree = repo.head_tree(&pull.head)?.clone();
        let message = format!("{} (#{number})", pull.title);
        let merge_commit = repo.commit_on(&pull.base, head_tree, message, sequence)?;
        if let Some(stored) = repo.pulls.get_mut(&number.value()) {
            stored.merged = true;
        }
        Ok(MergeOutcome {
            merged: true,
            sha: Some(merge_commit),
            message: format!("Pull request successfully merged ({method})"),
        })
    }

    async fn list_pull_request_files(
        &self,
        _token: &AccessToken,
        repository: &RepositoryFullName,
        number: PullRequestNumber,
    ) -> VcsHostResult<Vec<PullRequestFile>> {
        let state = self.enter(HostOperation::ListPullRequestFiles).await?;
        let repo = state.repository(repository)?;
        let pull = repo.pull(number)?;
        let base_tree = repo.tree(&repo.commit(&pull.base_commit)?.tree)?;
        let head_tree = repo.head_tree(&pull.head)?;
        Ok(diff_trees(base_tree, head_tree))
    }

    async fn get_repository(
        &self,
        _token: &AccessToken,
        repository: &RepositoryFullName,
    ) -> VcsHostResult<RepositoryMetadata> {
        let state = self.enter(HostOperation::GetRepository).await?;
        Ok(state.repository(repository)?.metadata.clone())
    }

    async fn list_contents(
        &self,
        _token: &AccessToken,
        repository: &RepositoryFullName,
        directory: Option<&FilePath>,
    ) -> VcsHostResult<Vec<ContentEntry>> {
        let state = self.enter(HostOperation::ListContents).await?;
        let repo = state.repository(repository)?;
        let tree = repo.head_tree(&repo.metadata.default_branch)?;
        let entries = list_directory(tree, directory);
        if entries.is_empty() && directory.is_some() {
            let missing = directory.map(FilePath::as_str).unwrap_or_default();
            return Err(VcsHostError::NotFound(format!("path {missing}")));
        }
        Ok(entries)
    }

    async fn get_file(
        &self,
        _token: &AccessToken,
        repository: &RepositoryFullName,
        path: &FilePath,
        branch: &BranchName,
    ) -> VcsHostResult<Option<RemoteFile>> {
        let state = self.enter(HostOperation::GetFile).await?;
        let repo = state.repository(repository)?;
        let tree = repo.head_tree(branch)?;
        Ok(tree.get(path).map(|blob| RemoteFile {
            path: path.clone(),
            sha: blob.clone(),
            content: repo.blobs.get(blob).cloned().unwrap_or_default(),
        }))
    }

    async fn put_file(
        &self,
        _token: &AccessToken,
        repository: &RepositoryFullName,
        write: &FileWrite,
    ) -> VcsHostResult<ObjectSha> {
        let mut state = self.enter(HostOperation::PutFile).await?;
        let sequence = state.next_sequence();
        let repo = state.repository_mut(repository)?;
        let mut tree = repo.head_tree(&write.branch)?.clone();
        match (tree.get(&write.path), &write.previous) {
            (Some(current), Some(previous)) if current != previous => {
                return Err(rejected(
                    409,
                    format!("{} does not match {previous}", write.path),
                ));
            }
            (Some(_), None) => {
                return Err(rejected(422, "\"sha\" wasn't supplied"));
            }
            _ => {}
        }
        let blob = repo.store_blob(&write.content)?;
        tree.insert(write.path.clone(), blob);
        repo.commit_on(&write.branch, tree, write.message.clone(), sequence)
    }
}
