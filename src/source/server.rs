//! HTTP endpoint that walks a directory on the serving machine.
//!
//! - `POST /api/local-repo` with `{"path": "/abs/dir"}` returns `{"tree": [...]}`.
//! - `GET /api/local-repo?path=<rel>&base=<dir>` returns `{"content": "..."}`.
//!
//! Errors are returned as `{"error": "..."}` with a 400/404/500 status.

use std::path::Path;

use rouille::{Request, Response};
use serde::{Deserialize, Serialize};

use crate::foundation::error::PlaybackError;
use crate::source::local::{list_dir, normalize_rel_path};
use crate::source::tree::TreeNode;

/// Request body for the tree endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct TreeRequest {
    /// Absolute directory to walk.
    #[serde(default)]
    pub path: Option<String>,
}

/// Response body for the tree endpoint.
#[derive(Debug, Serialize)]
pub struct TreeResponse {
    /// Full recursive listing.
    pub tree: Vec<TreeNode>,
}

/// Response body for the content endpoint.
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    /// Raw file text.
    pub content: String,
}

/// A failed request: HTTP status plus message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Message returned as `{"error": ...}`.
    pub message: String,
}

impl ApiError {
    fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn into_response(self) -> Response {
        Response::json(&serde_json::json!({ "error": self.message })).with_status_code(self.status)
    }
}

/// Build the full tree for an absolute directory.
pub fn tree_for_path(path: Option<&str>) -> Result<TreeResponse, ApiError> {
    let Some(path) = path.filter(|p| !p.trim().is_empty()) else {
        return Err(ApiError::new(400, "Path is required"));
    };
    let dir = Path::new(path);
    if !dir.exists() {
        return Err(ApiError::new(404, "Path does not exist"));
    }

    list_dir(dir, "", true)
        .map(|tree| TreeResponse { tree })
        .map_err(|e| {
            tracing::error!(path, error = %e, "failed to read local repository");
            ApiError::new(500, "Failed to read repository")
        })
}

/// Read one file relative to `base`.
pub fn content_for(path: Option<&str>, base: Option<&str>) -> Result<ContentResponse, ApiError> {
    let (Some(path), Some(base)) = (path, base) else {
        return Err(ApiError::new(400, "Path and base are required"));
    };
    if path.is_empty() || base.is_empty() {
        return Err(ApiError::new(400, "Path and base are required"));
    }
    let rel = normalize_rel_path(path).map_err(|e| ApiError::new(400, e.to_string()))?;

    let full = Path::new(base).join(rel);
    std::fs::read_to_string(&full)
        .map(|content| ContentResponse { content })
        .map_err(|e| {
            tracing::error!(path = %full.display(), error = %e, "failed to read file");
            ApiError::new(500, "Failed to read file")
        })
}

/// Route one request.
pub fn handle_request(request: &Request) -> Response {
    rouille::router!(request,
        (POST) ["/api/local-repo"] => {
            let tree = rouille::input::json_input::<TreeRequest>(request)
                .map_err(|e| ApiError::new(400, format!("Invalid JSON: {e}")))
                .and_then(|body| tree_for_path(body.path.as_deref()));
            match tree {
                Ok(tree) => Response::json(&tree),
                Err(e) => e.into_response(),
            }
        },
        (GET) ["/api/local-repo"] => {
            let path = request.get_param("path");
            let base = request.get_param("base");
            match content_for(path.as_deref(), base.as_deref()) {
                Ok(content) => Response::json(&content),
                Err(e) => e.into_response(),
            }
        },
        _ => Response::empty_404()
    )
}

/// Serve the endpoint on `addr` until the process exits.
pub fn serve(addr: &str) -> Result<(), PlaybackError> {
    let server = rouille::Server::new(addr, handle_request)
        .map_err(|e| PlaybackError::input(format!("failed to bind '{addr}': {e}")))?;
    tracing::info!("local repository server listening on http://{}", server.server_addr());
    server.run();
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/source/server.rs"]
mod tests;
