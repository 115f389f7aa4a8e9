//! Connection registry: which live socket belongs to whom, in which space.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;

/// Process-unique identifier for one live socket session.
pub type ConnectionId = u64;

/// Outbound half of a connection. Pre-serialized frames pushed here are
/// drained by the connection's writer task.
pub type FrameSender = UnboundedSender<String>;

#[derive(Debug, Clone)]
struct Connection {
    sender: FrameSender,
    user_id: Option<i64>,
    username: Option<String>,
    chat_space_id: Option<i64>,
}

/// Identity and space binding a connection held at unregister time.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub chat_space_id: Option<i64>,
}

/// Tracks the set of live connections and their space/identity bindings.
///
/// Entries are added on socket accept and removed on close; all mutation
/// goes through this table, shared across worker threads behind a
/// read-write lock. The registry is owned by the service instance, never
/// global state.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Connection>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unbound entry for a newly accepted socket
    pub async fn register(&self, sender: FrameSender) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.connections.write().await.insert(
            id,
            Connection {
                sender,
                user_id: None,
                username: None,
                chat_space_id: None,
            },
        );
        id
    }

    /// Bind identity and space to a connection after a validated join.
    ///
    /// Rebinding an already-bound connection moves it to the new space.
    pub async fn bind(
        &self,
        id: ConnectionId,
        user_id: i64,
        username: &str,
        chat_space_id: i64,
    ) {
        if let Some(connection) = self.connections.write().await.get_mut(&id) {
            connection.user_id = Some(user_id);
            connection.username = Some(username.to_string());
            connection.chat_space_id = Some(chat_space_id);
        }
    }

    /// Remove the entry, returning its last known binding so the caller
    /// can announce the departure. A no-op for unknown ids.
    pub async fn unregister(&self, id: ConnectionId) -> Option<Binding> {
        self.connections
            .write()
            .await
            .remove(&id)
            .map(|connection| Binding {
                user_id: connection.user_id,
                username: connection.username,
                chat_space_id: connection.chat_space_id,
            })
    }

    /// The space this connection is currently bound to, if any
    pub async fn bound_space(&self, id: ConnectionId) -> Option<i64> {
        self.connections
            .read()
            .await
            .get(&id)
            .and_then(|connection| connection.chat_space_id)
    }

    /// Outbound sender for one connection, if it is still registered
    pub async fn sender(&self, id: ConnectionId) -> Option<FrameSender> {
        self.connections
            .read()
            .await
            .get(&id)
            .map(|connection| connection.sender.clone())
    }

    /// Outbound senders of every open connection bound to the space.
    ///
    /// Connections whose channel has already closed are skipped; their own
    /// disconnect path removes them from the table.
    pub async fn senders_for_space(&self, chat_space_id: i64) -> Vec<FrameSender> {
        self.connections
            .read()
            .await
            .values()
            .filter(|connection| {
                connection.chat_space_id == Some(chat_space_id) && !connection.sender.is_closed()
            })
            .map(|connection| connection.sender.clone())
            .collect()
    }
}
