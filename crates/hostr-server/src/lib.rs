//! HTTP server for hostr.
//!
//! Serves a local directory over HTTP using axum, with live reload:
//! - Static files with directory-index and optional SPA fallback
//! - Reload-client script injection into served HTML
//! - WebSocket endpoint pushing reload notifications on file changes
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use hostr_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_string(),
//!         port: 8080,
//!         root: PathBuf::from("."),
//!         index_filename: "index.html".to_string(),
//!         spa_mode: false,
//!         live_reload_enabled: true,
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► Rust axum server (hostr-server)
//!                        │
//!                        ├─► /reload.js (fixed reload client)
//!                        │
//!                        ├─► /__reload WebSocket ◄── dispatcher ◄── notify watcher
//!                        │
//!                        └─► everything else: resolve ──► inject (HTML)
//!                                                     └─► tower-http ServeFile
//! ```

mod app;
mod error;
mod inject;
mod live_reload;
mod state;
mod static_files;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory to serve.
    pub root: PathBuf,
    /// File served when a request resolves to a directory.
    pub index_filename: String,
    /// Serve the index file for paths that match no real file.
    pub spa_mode: bool,
    /// Enable live reload (watcher, push endpoint, HTML injection).
    pub live_reload_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            root: PathBuf::from("."),
            index_filename: "index.html".to_owned(),
            spa_mode: false,
            live_reload_enabled: true,
        }
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the served root cannot be resolved, the file watcher
/// cannot be initialized, or the server fails to start. Watcher
/// initialization failure is fatal because live reload is a headline
/// feature, not best-effort degradation.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // The served root is resolved once and stays immutable for the
    // process lifetime.
    let root = std::fs::canonicalize(&config.root)?;

    let live_reload = if config.live_reload_enabled {
        Some(live_reload::LiveReload::start(&root)?)
    } else {
        None
    };

    let state = Arc::new(AppState {
        root,
        index_filename: config.index_filename.clone(),
        spa_mode: config.spa_mode,
        live_reload,
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, root = %config.root.display(), "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from hostr config.
#[must_use]
pub fn server_config_from_config(config: &hostr_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        root: config.root.clone(),
        index_filename: config.serve.index.clone(),
        spa_mode: config.serve.spa,
        live_reload_enabled: config.live_reload.enabled,
    }
}
