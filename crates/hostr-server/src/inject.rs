//! HTML injection.
//!
//! Rewrites served HTML so the browser participates in live reload:
//! the reload-client script is inserted after the first `<head>` tag (or
//! prepended when there is none), and every local stylesheet/script
//! reference gets a cache-busting query parameter unique to the response.

use std::path::Path;
use std::sync::LazyLock;

use axum::response::{Html, IntoResponse, Response};
use regex::{Captures, Regex};
use uuid::Uuid;

use crate::error::ServerError;

/// Script tag injected into every served HTML document.
const RELOAD_SCRIPT_TAG: &str = r#"<script src="/reload.js"></script>"#;

/// Local stylesheet/script references eligible for cache busting, with an
/// optional existing query string.
static ASSET_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(href|src)=["']([^"']+\.(?:css|js)(?:\?[^"']*)?)["']"#).unwrap()
});

/// Serve an HTML file with the reload client injected and local asset
/// references cache-busted.
///
/// # Errors
///
/// Returns a not-found error if the file cannot be read; no distinction is
/// made between missing and unreadable.
pub(crate) async fn serve_injected(path: &Path) -> Result<Response, ServerError> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|_| ServerError::FileNotFound(path.to_path_buf()))?;

    Ok(Html(inject(&source)).into_response())
}

/// Apply both rewrites, with a cache-busting token fresh for this response.
fn inject(html: &str) -> String {
    let html = inject_reload_script(html);
    bust_asset_cache(&html, &Uuid::new_v4().to_string())
}

/// Insert the reload script tag after the first `<head>`, or prepend it to
/// the document when no `<head>` tag exists.
fn inject_reload_script(html: &str) -> String {
    if html.contains("<head>") {
        html.replacen("<head>", &format!("<head>\n  {RELOAD_SCRIPT_TAG}"), 1)
    } else {
        format!("{RELOAD_SCRIPT_TAG}\n{html}")
    }
}

/// Append `v=<token>` to every local `.css`/`.js` reference. References
/// starting with `http` or `//` are external and left untouched.
fn bust_asset_cache(html: &str, token: &str) -> String {
    ASSET_REF
        .replace_all(html, |caps: &Captures<'_>| {
            let attribute = &caps[1];
            let target = &caps[2];

            if target.starts_with("http") || target.starts_with("//") {
                return caps[0].to_string();
            }

            let separator = if target.contains('?') { '&' } else { '?' };
            format!(r#"{attribute}="{target}{separator}v={token}""#)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_script_inserted_after_head() {
        let html = "<html><head><title>t</title></head><body></body></html>";
        let out = inject_reload_script(html);

        assert_eq!(out.matches(RELOAD_SCRIPT_TAG).count(), 1);
        let head = out.find("<head>").unwrap();
        let script = out.find(RELOAD_SCRIPT_TAG).unwrap();
        let title = out.find("<title>").unwrap();
        assert!(head < script && script < title);
    }

    #[test]
    fn test_script_prepended_without_head() {
        let html = "<body><h1>Hello</h1></body>";
        let out = inject_reload_script(html);

        assert!(out.starts_with(RELOAD_SCRIPT_TAG));
        assert_eq!(out.matches(RELOAD_SCRIPT_TAG).count(), 1);
    }

    #[test]
    fn test_cache_buster_appended_with_question_mark() {
        let html = r#"<link href="style.css">"#;
        let out = bust_asset_cache(html, "token123");

        assert_eq!(out, r#"<link href="style.css?v=token123">"#);
    }

    #[test]
    fn test_cache_buster_appended_with_ampersand_on_existing_query() {
        let html = r#"<script src="app.js?debug=1"></script>"#;
        let out = bust_asset_cache(html, "token123");

        assert_eq!(out, r#"<script src="app.js?debug=1&v=token123"></script>"#);
    }

    #[test]
    fn test_external_references_untouched() {
        let html = concat!(
            r#"<link href="https://cdn.example.com/lib.css">"#,
            r#"<script src="//cdn.example.com/lib.js"></script>"#,
        );
        let out = bust_asset_cache(html, "token123");

        assert_eq!(out, html);
    }

    #[test]
    fn test_non_asset_references_untouched() {
        let html = r#"<a href="about.html">about</a><img src="logo.png">"#;
        let out = bust_asset_cache(html, "token123");

        assert_eq!(out, html);
    }

    #[test]
    fn test_token_uniform_within_one_response() {
        let html = r#"<link href="a.css"><script src="b.js"></script>"#;
        let out = inject(html);

        // The injected /reload.js tag is itself a local script reference,
        // so three references carry the same token.
        let token = out
            .split("v=")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap();
        assert_eq!(out.matches(&format!("v={token}")).count(), 3);
    }

    #[test]
    fn test_tokens_differ_across_responses() {
        let html = r#"<head></head><link href="style.css">"#;
        let first = inject(html);
        let second = inject(html);

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.html");

        let result = serve_injected(&missing).await;

        assert!(matches!(result, Err(ServerError::FileNotFound(_))));
    }
}
