//! GitHub REST adapter for the [`VcsHost`] port.
//!
//! Reads use the configured read timeout and mutations the write timeout.
//! Paths and branch names are percent-encoded one segment at a time.
//! A 404 maps to [`VcsHostError::NotFound`]. A 422 while creating a ref maps
//! to [`VcsHostError::RefAlreadyExists`]. Every other non-success status
//! becomes [`VcsHostError::Rejected`].

mod wire;

use crate::change_set::domain::FilePath;
use crate::config::GitHubConfig;
use crate::vcs::{
    domain::{
        AccessToken, BranchName, CommitInfo, ContentEntry, FileWrite, MergeMethod, MergeOutcome,
        NewCommit, NewPullRequest, ObjectSha, PullRequestFile, PullRequestNumber, RemoteFile,
        RemotePullRequest, RepositoryFullName, RepositoryMetadata, TreeEntry,
    },
    ports::{VcsHost, VcsHostError, VcsHostResult},
};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use std::iter;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use wire::{
    CommitBody, ContentEntryBody, CreateBlobBody, CreateCommitBody, CreatePullBody,
    CreateRefBody, CreateTreeBody, ErrorBody, FileBody, MergeBody, MergeResultBody, PullBody,
    PullFileBody, PutFileBody, PutFileResult, RefBody, RepositoryBody, ShaOnly, TreeItem,
    UpdateRefBody,
};

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Error)]
#[error("API URL '{0}' cannot carry path segments")]
struct NotABaseUrl(String);

/// [`VcsHost`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubHost {
    client: Client,
    api_url: Url,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl GitHubHost {
    /// Builds an adapter from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VcsHostError::Transport`] when the HTTP client cannot be
    /// initialized or the API URL cannot be parsed as a base URL.
    pub fn new(config: &GitHubConfig) -> VcsHostResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(VcsHostError::transport)?;
        let api_url = Url::parse(config.api_url.trim_end_matches('/'))
            .map_err(VcsHostError::transport)?;
        if api_url.cannot_be_a_base() {
            return Err(VcsHostError::transport(NotABaseUrl(config.api_url.clone())));
        }
        Ok(Self {
            client,
            api_url,
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
        })
    }

    /// `<api>/repos/<owner>/<name>/<segments...>`, each segment encoded.
    fn repo_url<'s>(
        &self,
        repository: &RepositoryFullName,
        segments: impl IntoIterator<Item = &'s str>,
    ) -> VcsHostResult<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| VcsHostError::transport(NotABaseUrl(self.api_url.to_string())))?
            .pop_if_empty()
            .extend(["repos", repository.owner(), repository.name()])
            .extend(segments);
        Ok(url)
    }

    fn contents_url(
        &self,
        repository: &RepositoryFullName,
        path: Option<&FilePath>,
        branch: Option<&BranchName>,
    ) -> VcsHostResult<Url> {
        let nested = path.into_iter().flat_map(|path| path.as_str().split('/'));
        let mut url = self.repo_url(repository, iter::once("contents").chain(nested))?;
        if let Some(branch) = branch {
            url.query_pairs_mut().append_pair("ref", branch.as_str());
        }
        Ok(url)
    }

    fn authorized(&self, method: Method, url: Url, token: &AccessToken) -> RequestBuilder {
        debug!(method = %method, url = %url, "sending GitHub request");
        self.client
            .request(method, url)
            .bearer_auth(token.expose())
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(API_VERSION_HEADER, API_VERSION)
    }

    async fn read<T: DeserializeOwned>(&self, token: &AccessToken, url: Url) -> VcsHostResult<T> {
        let request = self.authorized(Method::GET, url, token);
        let response = dispatch(request, self.read_timeout).await?;
        decode(response, self.read_timeout).await
    }

    async fn write<B, T>(
        &self,
        method: Method,
        token: &AccessToken,
        url: Url,
        body: &B,
    ) -> VcsHostResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.authorized(method, url, token).json(body);
        let response = dispatch(request, self.write_timeout).await?;
        decode(response, self.write_timeout).await
    }
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> VcsHostError {
    if err.is_timeout() {
        VcsHostError::TimedOut(timeout)
    } else {
        VcsHostError::transport(err)
    }
}

async fn dispatch(request: RequestBuilder, timeout: Duration) -> VcsHostResult<Response> {
    let response = request
        .timeout(timeout)
        .send()
        .await
        .map_err(|err| transport_error(err, timeout))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map_or_else(|_| status.to_string(), |body| body.message);
    debug!(status = status.as_u16(), message = %message, "GitHub request failed");
    Err(status_error(status, message))
}

fn status_error(status: StatusCode, message: String) -> VcsHostError {
    if status == StatusCode::NOT_FOUND {
        return VcsHostError::NotFound(message);
    }
    VcsHostError::Rejected {
        status: status.as_u16(),
        message,
    }
}

/// GitHub answers 422 when the ref being created already exists.
fn ref_creation_error(err: VcsHostError, branch: &BranchName) -> VcsHostError {
    match err {
        VcsHostError::Rejected { status, .. }
            if status == StatusCode::UNPROCESSABLE_ENTITY.as_u16() =>
        {
            VcsHostError::RefAlreadyExists(branch.clone())
        }
        other => other,
    }
}

fn missing_as_none<T>(result: VcsHostResult<T>) -> VcsHostResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(VcsHostError::NotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

async fn decode<T: DeserializeOwned>(response: Response, timeout: Duration) -> VcsHostResult<T> {
    response.json::<T>().await.map_err(|err| {
        if err.is_timeout() {
            VcsHostError::TimedOut(timeout)
        } else {
            VcsHostError::InvalidResponse(err.to_string())
        }
    })
}

fn decode_content(encoded: &str) -> VcsHostResult<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|err| VcsHostError::InvalidResponse(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| VcsHostError::InvalidResponse(err.to_string()))
}

fn invalid(err: impl std::fmt::Display) -> VcsHostError {
    VcsHostError::InvalidResponse(err.to_string())
}

#[async_trait]
impl VcsHost for GitHubHost {
    async fn get_ref(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        branch: &BranchName,
    ) -> VcsHostResult<ObjectSha> {
        let segments = ["git", "ref", "heads"].into_iter().chain(branch.as_str().split('/'));
        let url = self.repo_url(repository, segments)?;
        let body: RefBody = self.read(token, url).await?;
        Ok(body.object.sha)
    }

    async fn create_ref(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        branch: &BranchName,
        sha: &ObjectSha,
    ) -> VcsHostResult<()> {
        let url = self.repo_url(repository, ["git", "refs"])?;
        let body = CreateRefBody {
            reference: branch.qualified(),
            sha,
        };
        self.write::<_, IgnoredAny>(Method::POST, token, url, &body)
            .await
            .map(|_| ())
            .map_err(|err| ref_creation_error(err, branch))
    }

    async fn get_commit(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        sha: &ObjectSha,
    ) -> VcsHostResult<CommitInfo> {
        let url = self.repo_url(repository, ["git", "commits", sha.as_str()])?;
        let body: CommitBody = self.read(token, url).await?;
        Ok(CommitInfo {
            sha: body.sha,
            tree: body.tree.sha,
            message: body.message,
        })
    }

    async fn create_blob(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        content: &str,
    ) -> VcsHostResult<ObjectSha> {
        let url = self.repo_url(repository, ["git", "blobs"])?;
        let body = CreateBlobBody {
            content,
            encoding: "utf-8",
        };
        let created: ShaOnly = self.write(Method::POST, token, url, &body).await?;
        Ok(created.sha)
    }

    async fn create_tree(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        base_tree: &ObjectSha,
        entries: &[TreeEntry],
    ) -> VcsHostResult<ObjectSha> {
        let url = self.repo_url(repository, ["git", "trees"])?;
        let body = CreateTreeBody {
            base_tree,
            tree: entries.iter().map(TreeItem::from).collect(),
        };
        let created: ShaOnly = self.write(Method::POST, token, url, &body).await?;
        Ok(created.sha)
    }

    async fn create_commit(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        commit: &NewCommit,
    ) -> VcsHostResult<ObjectSha> {
        let url = self.repo_url(repository, ["git", "commits"])?;
        let body = CreateCommitBody {
            message: &commit.message,
            tree: &commit.tree,
            parents: &commit.parents,
        };
        let created: ShaOnly = self.write(Method::POST, token, url, &body).await?;
        Ok(created.sha)
    }

    async fn update_ref(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        branch: &BranchName,
        sha: &ObjectSha,
    ) -> VcsHostResult<()> {
        let segments = ["git", "refs", "heads"].into_iter().chain(branch.as_str().split('/'));
        let url = self.repo_url(repository, segments)?;
        let body = UpdateRefBody { sha, force: false };
        self.write::<_, IgnoredAny>(Method::PATCH, token, url, &body)
            .await
            .map(|_| ())
    }

    async fn create_pull_request(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        request: &NewPullRequest,
    ) -> VcsHostResult<RemotePullRequest> {
        let url = self.repo_url(repository, ["pulls"])?;
        let body = CreatePullBody {
            title: &request.title,
            body: &request.body,
            head: request.head.as_str(),
            base: request.base.as_str(),
        };
        let created: PullBody = self.write(Method::POST, token, url, &body).await?;
        Ok(RemotePullRequest {
            number: PullRequestNumber::new(created.number).map_err(invalid)?,
            url: created.html_url,
        })
    }

    async fn merge_pull_request(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        number: PullRequestNumber,
        method: MergeMethod,
    ) -> VcsHostResult<MergeOutcome> {
        let number = number.to_string();
        let url = self.repo_url(repository, ["pulls", number.as_str(), "merge"])?;
        let body = MergeBody {
            merge_method: method.as_str(),
        };
        let result: MergeResultBody = self.write(Method::PUT, token, url, &body).await?;
        Ok(MergeOutcome {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        })
    }

    async fn list_pull_request_files(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        number: PullRequestNumber,
    ) -> VcsHostResult<Vec<PullRequestFile>> {
        let number = number.to_string();
        let url = self.repo_url(repository, ["pulls", number.as_str(), "files"])?;
        let files: Vec<PullFileBody> = self.read(token, url).await?;
        Ok(files
            .into_iter()
            .map(|file| PullRequestFile {
                filename: file.filename,
                status: file.status,
                additions: file.additions,
                deletions: file.deletions,
            })
            .collect())
    }

    async fn get_repository(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
    ) -> VcsHostResult<RepositoryMetadata> {
        let url = self.repo_url(repository, iter::empty())?;
        let body: RepositoryBody = self.read(token, url).await?;
        Ok(RepositoryMetadata {
            full_name: RepositoryFullName::new(body.full_name).map_err(invalid)?,
            default_branch: BranchName::new(body.default_branch).map_err(invalid)?,
            private: body.private,
            description: body.description,
        })
    }

    async fn list_contents(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        directory: Option<&FilePath>,
    ) -> VcsHostResult<Vec<ContentEntry>> {
        let url = self.contents_url(repository, directory, None)?;
        let entries: Vec<ContentEntryBody> = self.read(token, url).await?;
        Ok(entries
            .into_iter()
            .map(|entry| ContentEntry {
                name: entry.name,
                path: entry.path,
                kind: entry.kind,
            })
            .collect())
    }

    async fn get_file(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        path: &FilePath,
        branch: &BranchName,
    ) -> VcsHostResult<Option<RemoteFile>> {
        let url = self.contents_url(repository, Some(path), Some(branch))?;
        let Some(body) = missing_as_none(self.read::<FileBody>(token, url).await)? else {
            return Ok(None);
        };
        Ok(Some(RemoteFile {
            path: path.clone(),
            sha: body.sha,
            content: decode_content(&body.content)?,
        }))
    }

    async fn put_file(
        &self,
        token: &AccessToken,
        repository: &RepositoryFullName,
        write: &FileWrite,
    ) -> VcsHostResult<ObjectSha> {
        let url = self.contents_url(repository, Some(&write.path), None)?;
        let body = PutFileBody {
            message: &write.message,
            content: STANDARD.encode(&write.content),
            branch: write.branch.as_str(),
            sha: write.previous.as_ref(),
        };
        let result: PutFileResult = self.write(Method::PUT, token, url, &body).await?;
        Ok(result.commit.sha)
    }
}
