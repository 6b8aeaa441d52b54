use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{PlaybackError, PlaybackResult};
use crate::source::tree::{NodeKind, TreeNode, is_ignored, join_rel, sort_nodes};

/// Normalize and validate a repository-relative path.
///
/// The normalized result uses `/` separators and removes `.` segments. Absolute paths and parent
/// traversals (`..`) are rejected. An empty input names the root and normalizes to `""`.
pub fn normalize_rel_path(source: &str) -> PlaybackResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') || Path::new(source).is_absolute() {
        return Err(PlaybackError::input("repository paths must be relative"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PlaybackError::input("repository paths must not contain '..'"));
        }
        out.push(part);
    }

    Ok(out.join("/"))
}

/// Local directory backend rooted at `root`.
#[derive(Clone, Debug)]
pub struct LocalDir {
    root: PathBuf,
}

impl LocalDir {
    /// Open a backend rooted at an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> PlaybackResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(PlaybackError::not_found(format!(
                "directory '{}' does not exist",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Root directory of this backend.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Display name for the root, the last component of its path.
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    fn resolve(&self, rel: &str) -> PlaybackResult<(String, PathBuf)> {
        let rel = normalize_rel_path(rel)?;
        let full = if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&rel)
        };
        Ok((rel, full))
    }

    /// List the direct children of `rel` (one level, directories not expanded).
    pub fn list_children(&self, rel: &str) -> PlaybackResult<Vec<TreeNode>> {
        let (rel, full) = self.resolve(rel)?;
        list_dir(&full, &rel, false)
    }

    /// Eagerly walk the whole tree below `rel`.
    pub fn build_tree(&self, rel: &str) -> PlaybackResult<Vec<TreeNode>> {
        let (rel, full) = self.resolve(rel)?;
        list_dir(&full, &rel, true)
    }

    /// Read a file as UTF-8 text.
    pub fn read_file(&self, rel: &str) -> PlaybackResult<String> {
        let (rel, full) = self.resolve(rel)?;
        if rel.is_empty() || !full.is_file() {
            return Err(PlaybackError::not_found(format!("file '{rel}' does not exist")));
        }
        let text = std::fs::read_to_string(&full)
            .with_context(|| format!("failed to read '{}'", full.display()))?;
        Ok(text)
    }
}

/// Walk `dir`, producing nodes whose paths are prefixed with `rel`.
pub fn list_dir(dir: &Path, rel: &str, recursive: bool) -> PlaybackResult<Vec<TreeNode>> {
    if !dir.is_dir() {
        return Err(PlaybackError::not_found(format!(
            "directory '{}' does not exist",
            dir.display()
        )));
    }

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list directory '{}'", dir.display()))?;

    let mut nodes = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in '{}'", dir.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_ignored(&name) {
            continue;
        }
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to stat '{}'", entry.path().display()))?;
        let path = join_rel(rel, &name);
        let mut node = if file_type.is_dir() {
            TreeNode::directory(name, path)
        } else {
            TreeNode::file(name, path)
        };
        if recursive && node.kind == NodeKind::Directory {
            node.children = list_dir(&entry.path(), &node.path, true)?;
        }
        nodes.push(node);
    }

    sort_nodes(&mut nodes);
    Ok(nodes)
}

#[cfg(test)]
#[path = "../../tests/unit/source/local.rs"]
mod tests;
