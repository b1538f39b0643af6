//! Static file serving.
//!
//! Serves files from the project root. `/` maps to the generated output
//! file; any other path resolves within the root or is refused with 403.
//! Responses carry bare text bodies, nothing structured.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use path_clean::PathClean;

use crate::state::AppState;

/// Create router for serving documentation files.
pub(crate) fn static_router() -> Router<Arc<AppState>> {
    Router::new().fallback(serve_file)
}

/// Serve a file from the project root.
async fn serve_file(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    let uri_path = req.uri().path();

    let Some(file_path) = resolve_path(&state.root, &state.output_file, uri_path) else {
        tracing::debug!(path = %uri_path, "refused path outside serving root");
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    };

    if !matches!(tokio::fs::try_exists(&file_path).await, Ok(true)) {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }

    // The file can still vanish (or turn out to be a directory) between the
    // existence check and the read; both surface here as a read error
    match tokio::fs::read(&file_path).await {
        Ok(contents) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type_for(&file_path))
            .body(Body::from(contents))
            .unwrap(),
        Err(error) => {
            tracing::error!(path = %file_path.display(), %error, "failed to read file");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Map a request path onto the filesystem.
///
/// `/` goes to the output file. Everything else loses one leading slash
/// and resolves against the root with lexical normalization; paths landing
/// outside the root give `None`. A second leading slash makes the rest
/// absolute, which `join` takes verbatim and the root check then refuses.
/// The request path is used as-is - no percent-decoding, so an encoded
/// `..` is just a file name that won't exist.
fn resolve_path(root: &Path, output_file: &Path, uri_path: &str) -> Option<PathBuf> {
    if uri_path == "/" {
        return Some(output_file.to_path_buf());
    }

    let relative = uri_path.strip_prefix('/').unwrap_or(uri_path);
    let resolved = root.join(relative).clean();
    resolved.starts_with(root).then_some(resolved)
}

/// Content type from the file extension.
///
/// A fixed table covering what documentation builds emit; everything else
/// is served as plain text.
fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "text/plain",
    }
}
