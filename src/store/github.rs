// ABOUTME: FileStore backed by the GitHub repository contents API.
// ABOUTME: Uses reqwest over HTTPS with base64 file payloads and sha-conditioned writes.

use super::{CommitMeta, FileStore, RemoteFile, StoreError, WriteReceipt};
use crate::types::{CommitSha, Committer, RepoSlug, RevisionHash};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const ACCEPT: &str = "application/vnd.github+json";

/// Connection settings for a GitHub repository.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// API base URL (GitHub Enterprise installs use their own).
    pub api_url: String,
    /// Repository holding the deployment files.
    pub repository: RepoSlug,
    /// Access token; anonymous requests can read public repositories only.
    pub token: Option<String>,
    /// Git ref to read from and commit to. Defaults to the repository's default branch.
    pub branch: Option<String>,
}

impl GithubConfig {
    pub fn new(repository: RepoSlug) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            repository,
            token: None,
            branch: None,
        }
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

/// GitHub contents API client.
pub struct GithubStore {
    config: GithubConfig,
    http: reqwest::Client,
}

impl std::fmt::Debug for GithubStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubStore")
            .field("api_url", &self.config.api_url)
            .field("repository", &self.config.repository)
            .field("branch", &self.config.branch)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    committer: Option<&'a Committer>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: ShaRef,
    #[serde(default)]
    commit: Option<ShaRef>,
}

#[derive(Debug, Deserialize)]
struct ShaRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GithubStore {
    pub fn new(config: GithubConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("kit-deployer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    fn contents_url(&self, path: &str) -> String {
        let encoded: Vec<_> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment))
            .collect();

        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_url.trim_end_matches('/'),
            urlencoding::encode(self.config.repository.owner()),
            urlencoding::encode(self.config.repository.name()),
            encoded.join("/")
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);

        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn put(
        &self,
        path: &str,
        content: &[u8],
        sha: Option<&RevisionHash>,
        meta: CommitMeta<'_>,
    ) -> Result<WriteReceipt, StoreError> {
        let body = PutContents {
            message: meta.message,
            content: BASE64.encode(content),
            sha: sha.map(|s| s.as_str()),
            branch: self.config.branch.as_deref(),
            committer: meta.committer,
        };

        let url = self.contents_url(path);
        tracing::debug!(
            "PUT {} (sha: {})",
            url,
            sha.map(|s| s.short()).unwrap_or("none")
        );

        let response = self
            .request(Method::PUT, &url)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response, path).await?;

        let put: PutResponse = response
            .json()
            .await
            .map_err(|e| StoreError::transport(format!("unexpected write response: {e}")))?;

        let receipt = WriteReceipt {
            revision: RevisionHash::new(put.content.sha),
            commit: put.commit.map(|c| CommitSha::new(c.sha)),
        };
        if let Some(commit) = &receipt.commit {
            tracing::info!("Wrote {} in commit {}", path, commit.short());
        }
        Ok(receipt)
    }
}

/// Turn a non-success response into the matching `StoreError`.
async fn check_status(response: Response, path: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);

    Err(StoreError::from_status(status.as_u16(), path, message))
}

fn decode_contents(path: &str, contents: ContentsResponse) -> Result<RemoteFile, StoreError> {
    if let Some(kind) = contents.kind.as_deref()
        && kind != "file"
    {
        return Err(StoreError::Client {
            status: None,
            message: format!("{path} is a {kind}, not a file"),
        });
    }

    let raw = contents.content.unwrap_or_default();
    let content = match contents.encoding.as_deref() {
        Some("base64") | None => {
            // GitHub wraps base64 payloads at 60 columns
            let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            BASE64.decode(compact).map_err(|e| StoreError::Client {
                status: None,
                message: format!("invalid base64 content for {path}: {e}"),
            })?
        }
        Some(other) => {
            return Err(StoreError::Client {
                status: None,
                message: format!("unsupported content encoding '{other}' for {path}"),
            });
        }
    };

    Ok(RemoteFile {
        content,
        revision: RevisionHash::new(contents.sha),
    })
}

#[async_trait]
impl FileStore for GithubStore {
    async fn read(&self, path: &str) -> Result<RemoteFile, StoreError> {
        let url = self.contents_url(path);
        tracing::debug!("GET {}", url);

        let mut request = self.request(Method::GET, &url);
        if let Some(branch) = &self.config.branch {
            request = request.query(&[("ref", branch)]);
        }

        let response = check_status(request.send().await?, path).await?;
        let contents: ContentsResponse = response.json().await.map_err(|e| StoreError::Client {
            status: None,
            message: format!("unexpected contents response for {path}: {e}"),
        })?;

        decode_contents(path, contents)
    }

    async fn create(
        &self,
        path: &str,
        content: &[u8],
        meta: CommitMeta<'_>,
    ) -> Result<WriteReceipt, StoreError> {
        self.put(path, content, None, meta).await
    }

    async fn update(
        &self,
        path: &str,
        content: &[u8],
        expected: &RevisionHash,
        meta: CommitMeta<'_>,
    ) -> Result<WriteReceipt, StoreError> {
        self.put(path, content, Some(expected), meta).await
    }
}
