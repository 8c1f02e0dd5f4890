//! Client registry.
//!
//! Thread-safe set of connected push clients. The registry is the single
//! shared resource between WebSocket sessions and the dispatcher; all
//! access goes through [`register`](ClientRegistry::register),
//! [`deregister`](ClientRegistry::deregister) and
//! [`broadcast`](ClientRegistry::broadcast).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use uuid::Uuid;

use super::ChangeSignal;

/// Registry of connected push clients.
///
/// Lock discipline: the mutex is held only to insert, remove, or snapshot
/// the sender handles. It is released before any signal is sent, so a slow
/// client can never stall registration or deregistration of others.
pub(crate) struct ClientRegistry {
    clients: Mutex<HashMap<Uuid, mpsc::UnboundedSender<ChangeSignal>>>,
}

impl ClientRegistry {
    pub(crate) fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Register a new client and return its session guard.
    ///
    /// The guard deregisters on drop, so the registry entry is removed on
    /// every session exit path.
    pub(crate) fn register(self: &Arc<Self>) -> RegisteredClient {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        let active = {
            let mut clients = self.clients.lock().unwrap();
            clients.insert(id, tx);
            clients.len()
        };
        tracing::debug!(client = %id, active, "Reload client registered");

        RegisteredClient {
            id,
            registry: Arc::clone(self),
            rx,
        }
    }

    /// Remove a client. Idempotent: removing an absent id is a no-op.
    pub(crate) fn deregister(&self, id: Uuid) {
        let (removed, active) = {
            let mut clients = self.clients.lock().unwrap();
            (clients.remove(&id).is_some(), clients.len())
        };
        if removed {
            tracing::debug!(client = %id, active, "Reload client deregistered");
        }
    }

    /// Push one reload signal to every registered client.
    ///
    /// Delivery is fire-and-forget: a failed send means that client's
    /// session is already on its way out and will clean up after itself.
    pub(crate) fn broadcast(&self) {
        let senders: Vec<_> = {
            let clients = self.clients.lock().unwrap();
            clients.values().cloned().collect()
        };

        tracing::debug!(clients = senders.len(), "Broadcasting reload");
        for tx in senders {
            let _ = tx.send(ChangeSignal);
        }
    }
}

/// A registered push client session.
///
/// Holds the receiving end of the client's signal channel; dropping the
/// guard deregisters the client.
pub(crate) struct RegisteredClient {
    id: Uuid,
    registry: Arc<ClientRegistry>,
    rx: mpsc::UnboundedReceiver<ChangeSignal>,
}

impl RegisteredClient {
    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the next reload signal. Returns `None` if the registry side
    /// of the channel is gone.
    pub(crate) async fn recv(&mut self) -> Option<ChangeSignal> {
        self.rx.recv().await
    }
}

impl Drop for RegisteredClient {
    fn drop(&mut self) {
        self.registry.deregister(self.id);
    }
}
