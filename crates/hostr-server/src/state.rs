//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;

use crate::live_reload::LiveReload;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Absolute path of the served directory.
    pub(crate) root: PathBuf,
    /// File served when a request resolves to a directory.
    pub(crate) index_filename: String,
    /// Serve the index file for paths that match no real file.
    pub(crate) spa_mode: bool,
    /// Live reload subsystem (if enabled).
    pub(crate) live_reload: Option<LiveReload>,
}

impl AppState {
    /// Check if live reload (and with it HTML injection) is enabled.
    #[must_use]
    pub(crate) fn live_reload_enabled(&self) -> bool {
        self.live_reload.is_some()
    }
}
