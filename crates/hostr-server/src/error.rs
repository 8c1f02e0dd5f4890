//! Error types for the HTTP server.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// File missing or unreadable. Both surface as not found; the requester
    /// gets no distinction.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            Self::FileNotFound(_) => (StatusCode::NOT_FOUND, "404 not found").into_response(),
        }
    }
}
