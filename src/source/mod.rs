//! Repository sources: listing, content fetching and language tagging.

/// Backend selector, lazy expansion and file loading.
pub mod backend;
/// GitHub REST contents API client.
pub mod github;
pub mod language;
/// Local directory backend.
pub mod local;
pub mod server;
/// Tree node model.
pub mod tree;
