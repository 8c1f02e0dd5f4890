//! Static file serving.
//!
//! Resolves request paths against the served root (directory index and
//! optional SPA fallback) and delegates to `tower-http`'s `ServeFile` for
//! byte-exact transmission with MIME inference, or to the HTML injector
//! when live reload is enabled and the resolution is an HTML file.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::inject;
use crate::state::AppState;

/// Route prefix reserved for the reload WebSocket.
const RELOAD_ROUTE_PREFIX: &str = "/__reload";

/// Serve a request for anything that is not a reserved route.
pub(crate) async fn serve_request(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
) -> Response {
    let resolved = resolve(
        &state.root,
        &state.index_filename,
        state.spa_mode,
        req.uri().path(),
    );

    if state.live_reload_enabled() && is_html(&resolved) {
        return inject::serve_injected(&resolved).await.into_response();
    }

    match ServeFile::new(&resolved).oneshot(req).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// Resolve a request path to the file that should be served.
///
/// Directory resolutions get the index filename appended. In SPA mode, any
/// resolution that is not a regular file falls back to the root index, as
/// does the reload route prefix so the push channel's own path is never
/// swallowed by a client-side router.
fn resolve(root: &Path, index_filename: &str, spa_mode: bool, request_path: &str) -> PathBuf {
    let mut resolved = root.join(clean_path(request_path));

    if resolved.is_dir() {
        resolved = resolved.join(index_filename);
    }

    if spa_mode && (!resolved.is_file() || request_path.starts_with(RELOAD_ROUTE_PREFIX)) {
        resolved = root.join(index_filename);
    }

    resolved
}

/// Clean a request path into a relative path safe to join onto the root.
///
/// Percent-decodes, then walks components: `..` pops only previously
/// accepted components, so the result can never climb above the join
/// target.
fn clean_path(request_path: &str) -> PathBuf {
    let decoded = percent_decode_str(request_path).decode_utf8_lossy();

    let mut cleaned = PathBuf::new();
    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => cleaned.push(part),
            Component::ParentDir => {
                cleaned.pop();
            }
            _ => {}
        }
    }
    cleaned
}

/// Whether a resolved path names an HTML file.
fn is_html(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn site_with_index() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        dir
    }

    #[test]
    fn test_root_request_resolves_to_index() {
        let dir = site_with_index();

        let resolved = resolve(dir.path(), "index.html", false, "/");

        assert_eq!(resolved, dir.path().join("index.html"));
    }

    #[test]
    fn test_subdirectory_request_appends_index() {
        let dir = site_with_index();
        std::fs::create_dir(dir.path().join("docs")).unwrap();

        let resolved = resolve(dir.path(), "index.html", false, "/docs");

        assert_eq!(resolved, dir.path().join("docs/index.html"));
    }

    #[test]
    fn test_missing_route_without_spa_stays_literal() {
        let dir = site_with_index();

        let resolved = resolve(dir.path(), "index.html", false, "/missing-route");

        assert_eq!(resolved, dir.path().join("missing-route"));
    }

    #[test]
    fn test_missing_route_with_spa_falls_back_to_index() {
        let dir = site_with_index();

        let resolved = resolve(dir.path(), "index.html", true, "/missing-route");

        assert_eq!(resolved, dir.path().join("index.html"));
    }

    #[test]
    fn test_existing_file_with_spa_served_directly() {
        let dir = site_with_index();
        std::fs::write(dir.path().join("app.js"), "// js").unwrap();

        let resolved = resolve(dir.path(), "index.html", true, "/app.js");

        assert_eq!(resolved, dir.path().join("app.js"));
    }

    #[test]
    fn test_reload_route_with_spa_falls_back_to_index() {
        let dir = site_with_index();

        let resolved = resolve(dir.path(), "index.html", true, "/__reload");

        assert_eq!(resolved, dir.path().join("index.html"));
    }

    #[test]
    fn test_custom_index_filename() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.html"), "<html></html>").unwrap();

        let resolved = resolve(dir.path(), "main.html", false, "/");

        assert_eq!(resolved, dir.path().join("main.html"));
    }

    #[test]
    fn test_clean_path_strips_traversal() {
        assert_eq!(clean_path("/../../etc/passwd"), PathBuf::from("etc/passwd"));
        assert_eq!(clean_path("/a/../b"), PathBuf::from("b"));
        assert_eq!(clean_path("/a/./b"), PathBuf::from("a/b"));
        assert_eq!(clean_path("/.."), PathBuf::new());
    }

    #[test]
    fn test_clean_path_percent_decodes() {
        assert_eq!(clean_path("/my%20file.html"), PathBuf::from("my file.html"));
    }

    #[test]
    fn test_is_html() {
        assert!(is_html(Path::new("/site/index.html")));
        assert!(!is_html(Path::new("/site/style.css")));
        assert!(!is_html(Path::new("/site/html")));
    }
}
