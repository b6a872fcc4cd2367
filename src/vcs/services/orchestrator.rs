//! Multi-step commit delivery against a hosting service.
//!
//! A delivery runs eight remote steps in a fixed order. Each step consumes
//! the typed result of the one before it, so a step can never run without
//! its inputs. Blob uploads fail softly: a failed file is skipped and the
//! rest are still committed. Any other failure stops the sequence and
//! reports the failing step with the last milestone reached. The whole
//! sequence shares one time budget.

use super::delivery::{
    DeliveryFailure, DeliveryFailureReason, DeliveryReceipt, DeliveryRequest, SkippedFile,
};
use crate::change_set::domain::{ChangeSet, FileAction, FilePath};
use crate::vcs::{
    domain::{
        AccessToken, Branch, BranchName, CommitPlan, ContentEntry, FileWrite, MergeMethod,
        MergeOutcome, NewCommit, NewPullRequest, ObjectSha, ProtocolState, ProtocolStep,
        PullRequestFile, PullRequestNumber, RemotePullRequest, RepositoryFullName,
        RepositoryMetadata,
    },
    ports::{VcsHost, VcsHostResult},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout};
use tracing::{debug, info, instrument, warn};

/// Drives commit deliveries and single-file operations through a host.
#[derive(Debug)]
pub struct RepositoryCommitOrchestrator<H>
where
    H: VcsHost,
{
    host: Arc<H>,
    budget: Duration,
}

impl<H> Clone for RepositoryCommitOrchestrator<H>
where
    H: VcsHost,
{
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            budget: self.budget,
        }
    }
}

impl<H> RepositoryCommitOrchestrator<H>
where
    H: VcsHost,
{
    /// Creates an orchestrator whose deliveries must finish within `budget`.
    #[must_use]
    pub const fn new(host: Arc<H>, budget: Duration) -> Self {
        Self { host, budget }
    }

    /// Returns the underlying host.
    #[must_use]
    pub const fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Commits `changes` to a new branch and opens a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryFailure`] naming the failing step when the change
    /// set is empty, a non-blob step fails, every blob upload fails, or the
    /// budget runs out. Remote objects created before the failure remain.
    #[instrument(
        skip_all,
        fields(repository = %request.repository(), branch = %request.branch())
    )]
    pub async fn deliver(
        &self,
        token: &AccessToken,
        request: &DeliveryRequest,
        changes: &ChangeSet,
    ) -> Result<DeliveryReceipt, DeliveryFailure> {
        let mut run = DeliveryRun {
            host: &*self.host,
            token,
            request,
            budget: self.budget,
            deadline: Instant::now().checked_add(self.budget),
            reached: ProtocolState::Started,
            created_branch: None,
        };
        if changes.is_empty() {
            return Err(run.fail(ProtocolStep::CreateBlobs, DeliveryFailureReason::EmptyChangeSet));
        }

        let base = run.resolve_base_ref().await?;
        let branch_ready = run.create_branch(base).await?;
        let tree_known = run.read_base_tree(branch_ready).await?;
        let uploaded = run.create_blobs(tree_known, changes).await?;
        let tree_built = run.create_tree(uploaded).await?;
        let committed = run.create_commit(tree_built).await?;
        let moved = run.update_ref(committed).await?;
        let receipt = run.open_pull_request(moved).await?;

        info!(
            pull_request = %receipt.pull_request().number,
            files = receipt.plan().blobs().len(),
            skipped = receipt.skipped().len(),
            "delivered change set"
        );
        Ok(receipt)
    }

    /// Creates or updates one file on `branch` in its own commit.
    ///
    /// The current blob identifier is read first so existing files are
    /// updated rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns host errors from the existing-file read or the write.
    pub async fn write_file(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        branch: &BranchName,
        path: &FilePath,
        content: &str,
    ) -> VcsHostResult<ObjectSha> {
        let existing = self.host.get_file(token, repository, path, branch).await?;
        let message = if existing.is_some() {
            format!("Update {path}")
        } else {
            format!("Create {path}")
        };
        let write = FileWrite {
            path: path.clone(),
            content: content.to_owned(),
            message,
            branch: branch.clone(),
            previous: existing.map(|file| file.sha),
        };
        self.host.put_file(token, repository, &write).await
    }

    /// Squash-merges a pull request.
    ///
    /// # Errors
    ///
    /// Returns host errors when the merge is refused.
    pub async fn merge_pull_request(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        number: PullRequestNumber,
    ) -> VcsHostResult<MergeOutcome> {
        self.host
            .merge_pull_request(token, repository, number, MergeMethod::Squash)
            .await
    }

    /// Lists the files a pull request changes.
    ///
    /// # Errors
    ///
    /// Returns host errors.
    pub async fn pull_request_files(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        number: PullRequestNumber,
    ) -> VcsHostResult<Vec<PullRequestFile>> {
        self.host
            .list_pull_request_files(token, repository, number)
            .await
    }

    /// Reads repository metadata.
    ///
    /// # Errors
    ///
    /// Returns host errors.
    pub async fn repository(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
    ) -> VcsHostResult<RepositoryMetadata> {
        self.host.get_repository(token, repository).await
    }

    /// Lists the root directory of the default branch.
    ///
    /// # Errors
    ///
    /// Returns host errors.
    pub async fn list_root(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
    ) -> VcsHostResult<Vec<ContentEntry>> {
        self.host.list_contents(token, repository, None).await
    }
}

struct DeliveryRun<'a, H: ?Sized> {
    host: &'a H,
    token: &'a AccessToken,
    request: &'a DeliveryRequest,
    budget: Duration,
    /// `None` when the budget reaches past the clock's range.
    deadline: Option<Instant>,
    reached: ProtocolState,
    created_branch: Option<BranchName>,
}

struct BranchReady {
    branch: Branch,
}

struct TreeKnown {
    branch: Branch,
    plan: CommitPlan,
}

struct BlobsUploaded {
    branch: Branch,
    plan: CommitPlan,
    skipped: Vec<SkippedFile>,
}

struct TreeBuilt {
    branch: Branch,
    plan: CommitPlan,
    skipped: Vec<SkippedFile>,
    tree: ObjectSha,
}

struct CommitBuilt {
    branch: Branch,
    plan: CommitPlan,
    skipped: Vec<SkippedFile>,
    commit: ObjectSha,
}

struct RefMoved {
    branch: Branch,
    plan: CommitPlan,
    skipped: Vec<SkippedFile>,
}

impl<H> DeliveryRun<'_, H>
where
    H: VcsHost + ?Sized,
{
    /// Runs `call` within the remaining budget; `None` means it ran out.
    async fn bounded<T, F>(&self, call: F) -> Option<VcsHostResult<T>>
    where
        F: Future<Output = VcsHostResult<T>>,
    {
        let Some(deadline) = self.deadline else {
            return Some(call.await);
        };
        let remaining = deadline.saturating_duration_since(Instant::now());
        timeout(remaining, call).await.ok()
    }

    async fn call<T, F>(&self, step: ProtocolStep, call: F) -> Result<T, DeliveryFailure>
    where
        F: Future<Output = VcsHostResult<T>>,
    {
        match self.bounded(call).await {
            Some(Ok(value)) => Ok(value),
            Some(Err(err)) => Err(self.fail(step, DeliveryFailureReason::Host(err))),
            None => Err(self.fail(step, DeliveryFailureReason::TimedOut(self.budget))),
        }
    }

    fn reach(&mut self, step: ProtocolStep) {
        self.reached = step.completes();
        debug!(step = %step, state = %self.reached, "protocol step completed");
    }

    fn fail(&self, step: ProtocolStep, reason: DeliveryFailureReason) -> DeliveryFailure {
        warn!(
            step = %step,
            last_completed = %self.reached,
            reason = %reason,
            "delivery stopped"
        );
        DeliveryFailure::new(step, self.reached, reason, self.created_branch.clone())
    }

    fn repository(&self) -> &RepositoryFullName {
        self.request.repository()
    }

    async fn resolve_base_ref(&mut self) -> Result<ObjectSha, DeliveryFailure> {
        let step = ProtocolStep::ResolveBaseRef;
        let lookup = self
            .host
            .get_ref(self.token, self.repository(), self.request.base_branch());
        let base = self.call(step, lookup).await?;
        self.reach(step);
        Ok(base)
    }

    async fn create_branch(&mut self, base: ObjectSha) -> Result<BranchReady, DeliveryFailure> {
        let step = ProtocolStep::CreateBranch;
        let name = self.request.branch();
        let creation = self
            .host
            .create_ref(self.token, self.repository(), name, &base);
        self.call(step, creation).await?;
        self.created_branch = Some(name.clone());
        self.reach(step);
        Ok(BranchReady {
            branch: Branch::new(name.clone(), base),
        })
    }

    async fn read_base_tree(&mut self, ready: BranchReady) -> Result<TreeKnown, DeliveryFailure> {
        let step = ProtocolStep::ReadBaseTree;
        let lookup = self
            .host
            .get_commit(self.token, self.repository(), ready.branch.base_commit());
        let commit = self.call(step, lookup).await?;
        self.reach(step);
        Ok(TreeKnown {
            branch: ready.branch,
            plan: CommitPlan::new(commit.tree),
        })
    }

    async fn create_blobs(
        &mut self,
        known: TreeKnown,
        changes: &ChangeSet,
    ) -> Result<BlobsUploaded, DeliveryFailure> {
        let step = ProtocolStep::CreateBlobs;
        let TreeKnown { branch, mut plan } = known;
        let mut skipped = Vec::new();
        let mut attempted = 0_usize;

        for change in changes {
            if change.action() == FileAction::Delete {
                plan.remove(change.path().clone());
                continue;
            }
            attempted += 1;
            let upload = self
                .host
                .create_blob(self.token, self.repository(), change.content());
            match self.bounded(upload).await {
                Some(Ok(sha)) => plan.add_blob(change.path().clone(), sha),
                Some(Err(error)) => {
                    warn!(path = %change.path(), error = %error, "blob upload failed, skipping file");
                    skipped.push(SkippedFile {
                        path: change.path().clone(),
                        error,
                    });
                }
                None => return Err(self.fail(step, DeliveryFailureReason::TimedOut(self.budget))),
            }
        }

        if plan.is_empty() {
            return Err(self.fail(step, DeliveryFailureReason::NoBlobsCreated { attempted }));
        }
        self.reach(step);
        Ok(BlobsUploaded {
            branch,
            plan,
            skipped,
        })
    }

    async fn create_tree(&mut self, uploaded: BlobsUploaded) -> Result<TreeBuilt, DeliveryFailure> {
        let step = ProtocolStep::CreateTree;
        let entries = uploaded.plan.tree_entries();
        let creation = self.host.create_tree(
            self.token,
            self.repository(),
            uploaded.plan.base_tree(),
            &entries,
        );
        let tree = self.call(step, creation).await?;
        self.reach(step);
        let mut plan = uploaded.plan;
        plan.set_tree(tree.clone());
        Ok(TreeBuilt {
            branch: uploaded.branch,
            plan,
            skipped: uploaded.skipped,
            tree,
        })
    }

    async fn create_commit(&mut self, built: TreeBuilt) -> Result<CommitBuilt, DeliveryFailure> {
        let step = ProtocolStep::CreateCommit;
        let commit = NewCommit {
            message: self.request.commit_message().to_owned(),
            tree: built.tree,
            parents: vec![built.branch.base_commit().clone()],
        };
        let creation = self
            .host
            .create_commit(self.token, self.repository(), &commit);
        let sha = self.call(step, creation).await?;
        self.reach(step);
        let mut plan = built.plan;
        plan.set_commit(sha.clone());
        Ok(CommitBuilt {
            branch: built.branch,
            plan,
            skipped: built.skipped,
            commit: sha,
        })
    }

    async fn update_ref(&mut self, committed: CommitBuilt) -> Result<RefMoved, DeliveryFailure> {
        let step = ProtocolStep::UpdateRef;
        let update = self.host.update_ref(
            self.token,
            self.repository(),
            committed.branch.name(),
            &committed.commit,
        );
        self.call(step, update).await?;
        self.reach(step);
        let mut branch = committed.branch;
        branch.advance_to(committed.commit);
        Ok(RefMoved {
            branch,
            plan: committed.plan,
            skipped: committed.skipped,
        })
    }

    async fn open_pull_request(
        &mut self,
        moved: RefMoved,
    ) -> Result<DeliveryReceipt, DeliveryFailure> {
        let step = ProtocolStep::OpenPullRequest;
        let request = NewPullRequest {
            title: self.request.title().to_owned(),
            body: self.request.body().to_owned(),
            head: moved.branch.name().clone(),
            base: self.request.base_branch().clone(),
        };
        let creation = self
            .host
            .create_pull_request(self.token, self.repository(), &request);
        let pull_request: RemotePullRequest = self.call(step, creation).await?;
        self.reach(step);
        Ok(DeliveryReceipt::new(
            moved.branch,
            moved.plan,
            pull_request,
            moved.skipped,
        ))
    }
}
