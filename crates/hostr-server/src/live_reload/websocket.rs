//! WebSocket handler for live reload.
//!
//! Per-connection session: register with the client registry, relay
//! `"reload"` frames for each delivered change signal, deregister on every
//! exit path (the registration guard drops with the session).

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;

use super::RELOAD_MESSAGE;
use crate::state::AppState;

/// Handle WebSocket upgrade for live reload.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let Some(ref live_reload) = state.live_reload else {
        // Live reload not enabled, close connection
        return;
    };

    let mut client = live_reload.register();
    tracing::debug!(client = %client.id(), "Reload WebSocket connected");

    loop {
        tokio::select! {
            // Relay one reload frame per delivered signal
            signal = client.recv() => {
                if signal.is_none() {
                    break;
                }
                if socket
                    .send(Message::Text(RELOAD_MESSAGE.into()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
            // Clients send nothing meaningful; drain until close or error
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    }

    tracing::debug!(client = %client.id(), "Reload WebSocket closed");
}
