//! GitHub REST contents API backend.

use std::time::Duration;

use anyhow::Context as _;
use base64::Engine as _;
use serde::Deserialize;

use crate::foundation::error::{PlaybackError, PlaybackResult};
use crate::source::local::normalize_rel_path;
use crate::source::tree::{TreeNode, is_ignored, sort_nodes};

/// Default base URL for the GitHub REST API.
pub const GITHUB_API_BASE_URL: &str = "https://api.github.com";

/// Environment variable holding an optional API token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("code-playback/", env!("CARGO_PKG_VERSION"));

/// `owner/repo` pair identifying a repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoRef {
    /// Account or organization.
    pub owner: String,
    /// Repository name, without a `.git` suffix.
    pub repo: String,
}

impl RepoRef {
    /// Parse `owner/repo` or a `github.com` URL.
    pub fn parse(input: &str) -> PlaybackResult<Self> {
        let input = input.trim();
        let rest = if let Some(idx) = input.find("github.com/") {
            &input[idx + "github.com/".len()..]
        } else if input.contains('/') && !input.contains("://") {
            input
        } else {
            return Err(PlaybackError::input(
                "invalid GitHub repository format, use \"owner/repo\" or a GitHub URL",
            ));
        };

        let mut parts = rest.split('/').filter(|p| !p.is_empty());
        let owner = parts.next().unwrap_or_default();
        let repo = parts.next().unwrap_or_default();
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if owner.is_empty() || repo.is_empty() {
            return Err(PlaybackError::input(
                "invalid GitHub repository format, use \"owner/repo\" or a GitHub URL",
            ));
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// One item of a contents listing, or a single file object.
#[derive(Debug, Deserialize)]
struct ContentItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Listing(Vec<ContentItem>),
    Single(ContentItem),
}

/// Client for one repository's contents.
#[derive(Clone, Debug)]
pub struct GitHubClient {
    repo: RepoRef,
    base_url: String,
    token: Option<String>,
    http_client: reqwest::Client,
}

impl GitHubClient {
    /// Client for the public API, picking up `GITHUB_TOKEN` when set.
    pub fn new(repo: RepoRef) -> PlaybackResult<Self> {
        let token = std::env::var(GITHUB_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty());
        Self::with_base_url(repo, GITHUB_API_BASE_URL, token)
    }

    /// Client against an explicit API base URL.
    pub fn with_base_url(
        repo: RepoRef,
        base_url: impl Into<String>,
        token: Option<String>,
    ) -> PlaybackResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            repo,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            http_client,
        })
    }

    /// Repository this client reads from.
    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// API base URL in use.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url, self.repo.owner, self.repo.repo, path
        )
    }

    #[tracing::instrument(skip(self), fields(repo = %self.repo))]
    async fn get_contents(&self, path: &str) -> PlaybackResult<ContentsResponse> {
        let path = normalize_rel_path(path)?;
        let url = self.contents_url(&path);

        let mut req = self
            .http_client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("request to '{url}' failed"))?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PlaybackError::not_found(format!(
                "'{}' not found in {}",
                if path.is_empty() { "/" } else { path.as_str() },
                self.repo
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlaybackError::Other(anyhow::anyhow!(
                "GitHub API returned {status}: {}",
                body.trim()
            )));
        }

        let parsed = resp
            .json::<ContentsResponse>()
            .await
            .with_context(|| format!("failed to parse contents response for '{url}'"))?;
        Ok(parsed)
    }

    /// List the direct children of a directory. Subdirectories come back unexpanded.
    pub async fn list_children(&self, path: &str) -> PlaybackResult<Vec<TreeNode>> {
        let items = match self.get_contents(path).await? {
            ContentsResponse::Listing(items) => items,
            ContentsResponse::Single(item) => {
                return Err(PlaybackError::input(format!(
                    "'{}' is a {}, not a directory",
                    item.path, item.kind
                )));
            }
        };

        let mut nodes: Vec<TreeNode> = items
            .into_iter()
            .filter(|item| !is_ignored(&item.name))
            .map(|item| {
                if item.kind == "dir" {
                    TreeNode::directory(item.name, item.path)
                } else {
                    TreeNode::file(item.name, item.path)
                }
            })
            .collect();
        sort_nodes(&mut nodes);
        tracing::debug!(path, count = nodes.len(), "listed github directory");
        Ok(nodes)
    }

    /// Fetch and decode a file's text. Files without inline content yield `""`.
    pub async fn read_file(&self, path: &str) -> PlaybackResult<String> {
        match self.get_contents(path).await? {
            ContentsResponse::Single(item) => match item.content {
                Some(encoded) => decode_content(&encoded),
                None => Ok(String::new()),
            },
            ContentsResponse::Listing(_) => Err(PlaybackError::input(format!(
                "'{path}' is a directory, not a file"
            ))),
        }
    }
}

/// Decode the base64 payload of a contents response.
///
/// GitHub wraps the payload with line breaks, which are stripped before decoding. Invalid UTF-8
/// is replaced rather than rejected.
pub fn decode_content(encoded: &str) -> PlaybackResult<String> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| PlaybackError::serde(format!("invalid base64 file content: {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
#[path = "../../tests/unit/source/github.rs"]
mod tests;
