//! Live reload system.
//!
//! Watches the served directory for writes and pushes reload notifications
//! to connected browsers over a WebSocket. The moving parts:
//!
//! - [`watcher`]: notify-based filesystem watcher emitting [`ChangeSignal`]s
//! - [`ClientRegistry`]: the set of connected push clients
//! - dispatcher task: fans each signal out to every registered client
//! - [`websocket`]: per-connection session relaying `"reload"` frames

mod registry;
mod watcher;
mod websocket;

use std::path::Path;
use std::sync::Arc;

use axum::http::header;
use axum::response::IntoResponse;
use tokio::sync::mpsc;

use registry::{ClientRegistry, RegisteredClient};
pub(crate) use websocket::ws_handler;

/// Notification that something under the served root was written.
///
/// Carries no payload: the system does not track which file changed, only
/// that at least one reload is due.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChangeSignal;

/// Text frame pushed to every client when a change is detected.
pub(crate) const RELOAD_MESSAGE: &str = "reload";

/// Client script served at `/reload.js`: opens the push WebSocket and
/// reloads the page on any message.
const RELOAD_SCRIPT: &str = "\
const protocol = location.protocol === 'https:' ? 'wss' : 'ws';
const socket = new WebSocket(protocol + '://' + location.host + '/__reload');
socket.onmessage = () => location.reload();
";

/// Live reload subsystem: watcher, dispatcher, and client registry.
///
/// The watcher handle is held here so the underlying OS watches stay alive
/// for the process lifetime.
pub(crate) struct LiveReload {
    registry: Arc<ClientRegistry>,
    _watcher: notify::RecommendedWatcher,
}

impl LiveReload {
    /// Start watching `root` and dispatching change signals.
    ///
    /// # Errors
    ///
    /// Returns an error if the file watcher cannot be created. Individual
    /// unwatchable directories are logged and skipped instead.
    pub(crate) fn start(root: &Path) -> Result<Self, notify::Error> {
        let registry = Arc::new(ClientRegistry::new());
        let (watcher, signals) = watcher::watch(root)?;
        spawn_dispatcher(signals, Arc::clone(&registry));

        Ok(Self {
            registry,
            _watcher: watcher,
        })
    }

    /// Register a new push client. The returned guard deregisters on drop.
    pub(crate) fn register(&self) -> RegisteredClient {
        self.registry.register()
    }
}

/// Spawn the dispatcher task: consume change signals one at a time, fanning
/// each out to every registered client before taking the next.
fn spawn_dispatcher(
    mut signals: mpsc::UnboundedReceiver<ChangeSignal>,
    registry: Arc<ClientRegistry>,
) {
    tokio::spawn(async move {
        while signals.recv().await.is_some() {
            registry.broadcast();
        }
    });
}

/// Serve the fixed reload-client script.
pub(crate) async fn reload_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        RELOAD_SCRIPT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_dispatcher_fans_out_to_all_clients() {
        let registry = Arc::new(ClientRegistry::new());
        let (tx, rx) = mpsc::unbounded_channel();
        spawn_dispatcher(rx, Arc::clone(&registry));

        let mut clients: Vec<_> = (0..3).map(|_| registry.register()).collect();

        tx.send(ChangeSignal).unwrap();

        for client in &mut clients {
            let signal = tokio::time::timeout(Duration::from_secs(1), client.recv())
                .await
                .expect("client should receive a signal");
            assert!(signal.is_some());
        }
    }

    #[tokio::test]
    async fn test_rapid_signals_each_broadcast() {
        let registry = Arc::new(ClientRegistry::new());
        let (tx, rx) = mpsc::unbounded_channel();
        spawn_dispatcher(rx, Arc::clone(&registry));

        let mut client = registry.register();

        tx.send(ChangeSignal).unwrap();
        tx.send(ChangeSignal).unwrap();

        for _ in 0..2 {
            let signal = tokio::time::timeout(Duration::from_secs(1), client.recv())
                .await
                .expect("client should receive a signal");
            assert!(signal.is_some());
        }
    }

    #[test]
    fn test_reload_script_opens_push_endpoint() {
        assert!(RELOAD_SCRIPT.contains("/__reload"));
        assert!(RELOAD_SCRIPT.contains("location.reload()"));
    }
}
