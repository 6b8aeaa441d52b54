use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{PlaybackError, PlaybackResult};
use crate::source::github::{GitHubClient, RepoRef};
use crate::source::language::language_for_filename;
use crate::source::local::LocalDir;
use crate::source::tree::TreeNode;

/// Which backend a repository comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// GitHub REST contents API.
    #[default]
    GitHub,
    /// Local directory.
    Local,
}

impl BackendKind {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::Local => "local",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(Self::GitHub),
            "local" => Ok(Self::Local),
            other => Err(PlaybackError::input(format!("unknown backend '{other}'"))),
        }
    }
}

/// A file's text together with its display language, ready for playback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the repository root.
    pub path: String,
    /// Full text.
    pub text: Arc<str>,
    /// Display-language tag.
    pub language: String,
}

impl SourceFile {
    /// Build a source file, deriving the language from the path.
    pub fn new(path: impl Into<String>, text: impl Into<Arc<str>>) -> Self {
        let path = path.into();
        let language = language_for_filename(&path).to_string();
        Self {
            path,
            text: text.into(),
            language,
        }
    }

    /// File name (last path segment).
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A repository source: the backend selector passed to listing and fetching.
#[derive(Clone, Debug)]
pub enum Backend {
    /// Remote repository, children fetched lazily.
    GitHub(GitHubClient),
    /// Local directory.
    Local(LocalDir),
}

impl Backend {
    /// Open a GitHub repository from `owner/repo` or a URL.
    pub fn github(input: &str) -> PlaybackResult<Self> {
        Ok(Self::GitHub(GitHubClient::new(RepoRef::parse(input)?)?))
    }

    /// Open a local directory.
    pub fn local(root: impl Into<std::path::PathBuf>) -> PlaybackResult<Self> {
        Ok(Self::Local(LocalDir::open(root)?))
    }

    /// Kind of this backend.
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::GitHub(_) => BackendKind::GitHub,
            Self::Local(_) => BackendKind::Local,
        }
    }

    /// Human label (`owner/repo` or the directory name).
    pub fn label(&self) -> String {
        match self {
            Self::GitHub(c) => c.repo().to_string(),
            Self::Local(d) => d.name(),
        }
    }

    /// List the direct children of `path` (`""` for the root).
    pub async fn list_children(&self, path: &str) -> PlaybackResult<Vec<TreeNode>> {
        match self {
            Self::GitHub(c) => c.list_children(path).await,
            Self::Local(d) => d.list_children(path),
        }
    }

    /// Read a file's raw text.
    pub async fn read_file(&self, path: &str) -> PlaybackResult<String> {
        match self {
            Self::GitHub(c) => c.read_file(path).await,
            Self::Local(d) => d.read_file(path),
        }
    }

    /// Read a file and attach its display language.
    #[tracing::instrument(skip(self), fields(backend = self.kind().as_str()))]
    pub async fn load_file(&self, path: &str) -> PlaybackResult<SourceFile> {
        let text = self.read_file(path).await?;
        tracing::debug!(chars = text.chars().count(), "loaded file");
        Ok(SourceFile::new(path, text))
    }

    /// Expand a directory node in place.
    ///
    /// Returns `true` when children were fetched. Files and already-expanded directories are left
    /// alone and never trigger a fetch.
    pub async fn expand(&self, node: &mut TreeNode) -> PlaybackResult<bool> {
        if !node.needs_expansion() {
            return Ok(false);
        }
        let children = self.list_children(&node.path).await?;
        Ok(node.attach_children(children))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/backend.rs"]
mod tests;
