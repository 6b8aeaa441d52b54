use serde::{Deserialize, Serialize};

/// Directory names that never show up in a listing.
pub const IGNORED_DIRS: &[&str] = &["node_modules", "dist", "build"];

/// Whether a tree node is a file or a directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Regular file.
    File,
    /// Directory; children are populated lazily.
    Directory,
}

/// One entry of a repository listing.
///
/// `children` is empty until the node is expanded. An empty vector means "not yet expanded", not
/// "no children", so an already non-empty directory is never fetched again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Entry name (last path segment).
    pub name: String,
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    /// File or directory.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Child nodes, sorted directories-first then by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
    /// Loaded file content, when fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Display-language tag, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl TreeNode {
    /// A file node.
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name.into(), path.into(), NodeKind::File)
    }

    /// A directory node with no children yet.
    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name.into(), path.into(), NodeKind::Directory)
    }

    fn new(name: String, path: String, kind: NodeKind) -> Self {
        Self {
            name,
            path,
            kind,
            children: Vec::new(),
            content: None,
            language: None,
        }
    }

    /// `true` for directories.
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// `true` for directories whose children have not been fetched yet.
    pub fn needs_expansion(&self) -> bool {
        self.is_dir() && self.children.is_empty()
    }

    /// Attach freshly listed children.
    ///
    /// Returns `false` and leaves the node untouched when it is a file or already expanded.
    pub fn attach_children(&mut self, mut children: Vec<TreeNode>) -> bool {
        if !self.needs_expansion() {
            return false;
        }
        sort_nodes(&mut children);
        self.children = children;
        true
    }

    /// Depth-first lookup of a node by its relative path.
    pub fn find_mut(&mut self, path: &str) -> Option<&mut TreeNode> {
        if self.path == path {
            return Some(self);
        }
        find_in_mut(&mut self.children, path)
    }
}

/// Depth-first lookup of a node by its relative path inside a forest.
pub fn find_in_mut<'a>(nodes: &'a mut [TreeNode], path: &str) -> Option<&'a mut TreeNode> {
    for node in nodes {
        let descend = node.path == path
            || path
                .strip_prefix(node.path.as_str())
                .is_some_and(|rest| rest.starts_with('/'));
        if descend {
            return node.find_mut(path);
        }
    }
    None
}

/// Names hidden from every listing: dot-files and known build-artifact directories.
pub fn is_ignored(name: &str) -> bool {
    name.starts_with('.') || IGNORED_DIRS.contains(&name)
}

/// Sort directories first, then by name.
pub fn sort_nodes(nodes: &mut [TreeNode]) {
    nodes.sort_by(|a, b| {
        b.is_dir()
            .cmp(&a.is_dir())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Join a parent relative path with a child name.
pub fn join_rel(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/tree.rs"]
mod tests;
