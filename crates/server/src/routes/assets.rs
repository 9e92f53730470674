//! Static file host for everything no route claims.
//!
//! Paths map onto the public directory (`/` serves `index.html`). The
//! content type comes from the extension alone; unknown extensions are
//! served as HTML.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use axum::{
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

use crate::state::AppState;

const INDEX_FILE: &str = "index.html";

/// Content type for a file, by extension.
#[must_use]
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        _ => "text/html",
    }
}

/// Resolve a request path below `root`.
///
/// Returns `None` for anything that is not a plain relative path, such as
/// `..` segments.
#[must_use]
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let relative = if relative.is_empty() { INDEX_FILE } else { relative };

    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

/// Serve a file from the public directory.
pub async fn serve(State(state): State<AppState>, uri: Uri) -> Response {
    let Some(path) = resolve(&state.config().public_dir, uri.path()) else {
        tracing::debug!(path = uri.path(), "Rejected static path");
        return not_found();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type_for(&path))], bytes).into_response(),
        // A directory without index.html reads as a missing file
        Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
            not_found()
        }
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "Failed to read static file");
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "File not found").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("css/styles.css")), "text/css");
        assert_eq!(content_type_for(Path::new("js/chat.js")), "text/javascript");
        assert_eq!(content_type_for(Path::new("data.json")), "application/json");
        assert_eq!(content_type_for(Path::new("img/logo.png")), "image/png");
        assert_eq!(content_type_for(Path::new("img/photo.jpg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("img/photo.jpeg")), "text/html");
        assert_eq!(content_type_for(Path::new("index.html")), "text/html");
        assert_eq!(content_type_for(Path::new("README")), "text/html");
    }

    #[test]
    fn test_resolve_root_is_index() {
        let root = Path::new("/srv/public");
        assert_eq!(resolve(root, "/"), Some(root.join("index.html")));
        assert_eq!(
            resolve(root, "/css/styles.css"),
            Some(root.join("css").join("styles.css"))
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = Path::new("/srv/public");
        assert_eq!(resolve(root, "/../secret.txt"), None);
        assert_eq!(resolve(root, "/css/../../etc/passwd"), None);
    }
}
