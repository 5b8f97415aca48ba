//! Room-partitioned registry of live WebSocket connections.
//!
//! [`RoomRegistry`] groups connections under a room label and fans text
//! frames out to every member of a room. Each [`Connection`] is the sending
//! half of a bounded queue drained by the socket's writer task. A send fails
//! when the remote end is gone or has stopped reading and its queue is full;
//! either way the connection is pruned.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{RwLock, mpsc};

/// Frames a connection may have queued before it counts as stalled.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a registered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Outbound handle to one live connection.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    sender: mpsc::Sender<String>,
}

impl Connection {
    /// Wraps the sending half of a connection's outbound queue.
    #[must_use]
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self {
            id: ConnectionId::next(),
            sender,
        }
    }

    /// Creates a connection together with the receiver its writer drains,
    /// holding at most [`OUTBOUND_QUEUE_CAPACITY`] frames.
    #[must_use]
    pub fn channel() -> (Self, mpsc::Receiver<String>) {
        Self::with_capacity(OUTBOUND_QUEUE_CAPACITY)
    }

    /// Like [`Connection::channel`] with an explicit queue capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// Returns this connection's identifier.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    fn send_text(&self, text: &str) -> Result<(), mpsc::error::TrySendError<String>> {
        self.sender.try_send(text.to_owned())
    }
}

/// Registry mapping room labels to their live connections.
///
/// Cloning is cheap and every clone shares the same rooms. The registry is
/// created once at startup and held in the application state.
///
/// # Concurrency
///
/// - Locks are held only to mutate or snapshot a room, never across a send.
/// - A connection may register or disconnect while a broadcast is running.
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<RwLock<HashMap<String, Vec<Connection>>>>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `connection` under `room`, creating the room on first use.
    pub async fn connect(&self, room: &str, connection: Connection) {
        let id = connection.id();
        let mut rooms = self.rooms.write().await;
        let members = rooms.entry(room.to_owned()).or_default();
        members.push(connection);
        tracing::debug!(room, connection = %id, members = members.len(), "connection registered");
    }

    /// Removes a connection from `room`. Drops the room once it is empty.
    ///
    /// Returns `true` if the connection was registered.
    pub async fn disconnect(&self, room: &str, id: ConnectionId) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(members) = rooms.get_mut(room) else {
            return false;
        };
        let Some(pos) = members.iter().position(|c| c.id == id) else {
            return false;
        };
        members.remove(pos);
        if members.is_empty() {
            rooms.remove(room);
        }
        tracing::debug!(room, connection = %id, "connection removed");
        true
    }

    /// Sends `message` to every connection currently in `room`.
    ///
    /// Membership is snapshotted before sending. Sends never wait: a
    /// connection that is closed or whose queue is full is disconnected and
    /// delivery to the others continues.
    /// Returns the number of connections that accepted the message.
    pub async fn broadcast(&self, room: &str, message: &str) -> usize {
        let snapshot = match self.rooms.read().await.get(room) {
            Some(members) => members.clone(),
            None => return 0,
        };

        let mut delivered = 0;
        let mut broken = Vec::new();
        for connection in &snapshot {
            match connection.send_text(message) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => broken.push((connection.id, "stalled")),
                Err(mpsc::error::TrySendError::Closed(_)) => broken.push((connection.id, "closed")),
            }
        }

        for (id, reason) in broken {
            tracing::warn!(room, connection = %id, reason, "pruning connection");
            self.disconnect(room, id).await;
        }
        delivered
    }

    /// Number of connections registered in `room`.
    pub async fn room_size(&self, room: &str) -> usize {
        self.rooms.read().await.get(room).map_or(0, Vec::len)
    }

    /// Number of rooms with at least one connection.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_member() {
        let registry = RoomRegistry::new();
        let (a, mut rx_a) = Connection::channel();
        let (b, mut rx_b) = Connection::channel();
        registry.connect("R1", a).await;
        registry.connect("R1", b).await;

        assert_eq!(registry.broadcast("R1", "hi").await, 2);
        assert_eq!(rx_a.recv().await.as_deref(), Some("hi"));
        assert_eq!(rx_b.recv().await.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn failed_send_prunes_only_that_connection() {
        let registry = RoomRegistry::new();
        let (alive, mut rx_alive) = Connection::channel();
        let (dead, rx_dead) = Connection::channel();
        registry.connect("R1", dead).await;
        registry.connect("R1", alive).await;
        drop(rx_dead);

        assert_eq!(registry.broadcast("R1", "hi").await, 1);
        assert_eq!(rx_alive.recv().await.as_deref(), Some("hi"));
        assert_eq!(registry.room_size("R1").await, 1);
    }

    #[tokio::test]
    async fn broadcast_to_unknown_room_is_noop() {
        let registry = RoomRegistry::new();
        assert_eq!(registry.broadcast("nobody-here", "hi").await, 0);
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn last_disconnect_removes_room() {
        let registry = RoomRegistry::new();
        let (conn, _rx) = Connection::channel();
        let id = conn.id();
        registry.connect("R1", conn).await;
        assert_eq!(registry.room_count().await, 1);

        assert!(registry.disconnect("R1", id).await);
        assert_eq!(registry.room_count().await, 0);
        assert!(!registry.disconnect("R1", id).await);
    }

    #[tokio::test]
    async fn rooms_are_isolated() {
        let registry = RoomRegistry::new();
        let (a, mut rx_a) = Connection::channel();
        let (b, mut rx_b) = Connection::channel();
        registry.connect("R1", a).await;
        registry.connect("R2", b).await;

        assert_eq!(registry.broadcast("R2", "only-r2").await, 1);
        assert_eq!(rx_b.recv().await.as_deref(), Some("only-r2"));
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn pruning_the_last_member_drops_the_room() {
        let registry = RoomRegistry::new();
        let (conn, rx) = Connection::channel();
        registry.connect("R1", conn).await;
        drop(rx);

        assert_eq!(registry.broadcast("R1", "hi").await, 0);
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn full_queue_prunes_stalled_reader() {
        let registry = RoomRegistry::new();
        let (stalled, mut rx_stalled) = Connection::with_capacity(2);
        let (reader, mut rx_reader) = Connection::channel();
        registry.connect("R1", stalled).await;
        registry.connect("R1", reader).await;

        assert_eq!(registry.broadcast("R1", "one").await, 2);
        assert_eq!(registry.broadcast("R1", "two").await, 2);
        assert_eq!(registry.room_size("R1").await, 2);

        assert_eq!(registry.broadcast("R1", "three").await, 1);
        assert_eq!(registry.room_size("R1").await, 1);
        assert_eq!(registry.broadcast("R1", "four").await, 1);

        for expected in ["one", "two", "three", "four"] {
            assert_eq!(rx_reader.recv().await.as_deref(), Some(expected));
        }
        assert_eq!(rx_stalled.recv().await.as_deref(), Some("one"));
        assert_eq!(rx_stalled.recv().await.as_deref(), Some("two"));
        assert_eq!(rx_stalled.recv().await, None);
    }

    #[test]
    fn connection_ids_are_unique() {
        let (a, _rx_a) = Connection::channel();
        let (b, _rx_b) = Connection::channel();
        assert_ne!(a.id(), b.id());
    }
}
