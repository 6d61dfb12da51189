//! Connection registry
//!
//! Maps users to their live connections using DashMap for thread-safe access.
//! Injected into services as an `EventSink`.

use super::{Connection, ConnectionId};
use crate::protocol::GatewayMessage;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use stay_core::{DomainEvent, EventSink, Snowflake};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Messages buffered per connection before deliveries start being dropped
pub const DEFAULT_BUFFER: usize = 64;

/// All live connections, indexed by connection and by user
pub struct ConnectionRegistry {
    /// Active connections by ID
    connections: DashMap<ConnectionId, Arc<Connection>>,

    /// User ID to connection IDs mapping
    user_connections: DashMap<Snowflake, HashSet<ConnectionId>>,

    /// Last dispatch sequence number
    sequence: AtomicU64,

    buffer: usize,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_BUFFER)
    }

    /// Registry whose connections buffer `buffer` undelivered messages
    #[must_use]
    pub fn with_buffer(buffer: usize) -> Self {
        Self {
            connections: DashMap::new(),
            user_connections: DashMap::new(),
            sequence: AtomicU64::new(0),
            buffer: buffer.max(1),
        }
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Open a connection for `user_id`
    ///
    /// Dropping the returned receiver closes the connection; it is pruned on
    /// the next delivery to that user.
    pub fn connect(&self, user_id: Snowflake) -> (ConnectionId, mpsc::Receiver<GatewayMessage>) {
        let (tx, rx) = mpsc::channel(self.buffer);
        let connection = Arc::new(Connection::new(user_id, tx));
        let id = connection.id();

        self.connections.insert(id, connection);
        self.user_connections.entry(user_id).or_default().insert(id);

        tracing::debug!(connection_id = %id, user_id = %user_id, "Connection added");

        (id, rx)
    }

    /// Remove a connection. Returns false if it was not registered.
    pub fn disconnect(&self, connection_id: ConnectionId) -> bool {
        let Some((_, connection)) = self.connections.remove(&connection_id) else {
            return false;
        };
        let user_id = connection.user_id();

        if let Some(mut ids) = self.user_connections.get_mut(&user_id) {
            ids.remove(&connection_id);
        }
        self.user_connections.remove_if(&user_id, |_, ids| ids.is_empty());

        tracing::debug!(connection_id = %connection_id, user_id = %user_id, "Connection removed");

        true
    }

    pub fn get_connection(&self, connection_id: ConnectionId) -> Option<Arc<Connection>> {
        self.connections.get(&connection_id).map(|r| r.clone())
    }

    /// Live connections held by a user
    pub fn connection_count(&self, user_id: Snowflake) -> usize {
        self.user_connections.get(&user_id).map_or(0, |ids| ids.len())
    }

    /// Connections across all users
    pub fn total_connections(&self) -> usize {
        self.connections.len()
    }

    /// Users holding at least one connection
    pub fn user_count(&self) -> usize {
        self.user_connections.len()
    }

    fn user_connection_list(&self, user_id: Snowflake) -> Vec<Arc<Connection>> {
        let ids: Vec<ConnectionId> = self
            .user_connections
            .get(&user_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();

        ids.into_iter()
            .filter_map(|id| self.get_connection(id))
            .collect()
    }

    /// Push a message to every connection of a user, pruning closed ones
    pub fn send_to_user(&self, user_id: Snowflake, message: &GatewayMessage) -> usize {
        let mut sent = 0;
        let mut closed = Vec::new();

        for conn in self.user_connection_list(user_id) {
            match conn.try_send(message.clone()) {
                Ok(()) => sent += 1,
                Err(TrySendError::Closed(_)) => closed.push(conn.id()),
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        connection_id = %conn.id(),
                        user_id = %user_id,
                        "Connection buffer full, dropping message"
                    );
                }
            }
        }

        for id in closed {
            self.disconnect(id);
        }

        tracing::trace!(user_id = %user_id, sent = sent, "Message sent to user connections");

        sent
    }

    /// Remove every connection whose receiver has gone away
    pub fn cleanup_closed_connections(&self) -> usize {
        let closed: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|r| r.is_closed())
            .map(|r| *r.key())
            .collect();

        let count = closed.len();
        for id in closed {
            self.disconnect(id);
        }

        if count > 0 {
            tracing::info!(count = count, "Cleaned up closed connections");
        }

        count
    }
}

impl EventSink for ConnectionRegistry {
    fn deliver(&self, user_id: Snowflake, event: &DomainEvent) -> usize {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        match GatewayMessage::dispatch(event, sequence) {
            Ok(message) => self.send_to_user(user_id, &message),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    event_type = event.event_type(),
                    "Failed to encode event for dispatch"
                );
                0
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.connections.len())
            .field("users", &self.user_connections.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stay_core::entities::{Message, MessageKind};

    fn message_event(sender: i64, receiver: i64) -> DomainEvent {
        DomainEvent::message_created(&Message::new(
            Snowflake::new(100),
            Snowflake::new(50),
            Snowflake::new(sender),
            Snowflake::new(receiver),
            "hello".to_string(),
            MessageKind::Text,
        ))
    }

    #[test]
    fn test_registry_creation() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.total_connections(), 0);
        assert_eq!(registry.user_count(), 0);
    }

    #[test]
    fn test_connect_disconnect() {
        let registry = ConnectionRegistry::new();
        let user = Snowflake::new(1);

        let (id, _rx) = registry.connect(user);
        assert_eq!(registry.connection_count(user), 1);
        assert_eq!(registry.get_connection(id).unwrap().user_id(), user);

        assert!(registry.disconnect(id));
        assert_eq!(registry.connection_count(user), 0);
        assert_eq!(registry.user_count(), 0);
        assert!(!registry.disconnect(id));
    }

    #[tokio::test]
    async fn test_deliver_reaches_every_connection_of_user() {
        let registry = ConnectionRegistry::new();
        let receiver = Snowflake::new(2);
        let (_a, mut rx_a) = registry.connect(receiver);
        let (_b, mut rx_b) = registry.connect(receiver);
        let (_c, mut rx_other) = registry.connect(Snowflake::new(1));

        let event = message_event(1, 2);
        assert_eq!(registry.deliver(receiver, &event), 2);

        assert_eq!(rx_a.recv().await.unwrap().event().unwrap(), event);
        assert_eq!(rx_b.recv().await.unwrap().event().unwrap(), event);
        assert!(rx_other.try_recv().is_err());
    }

    #[test]
    fn test_deliver_to_offline_user() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.deliver(Snowflake::new(9), &message_event(1, 9)), 0);
    }

    #[test]
    fn test_closed_receivers_pruned_on_delivery() {
        let registry = ConnectionRegistry::new();
        let user = Snowflake::new(2);
        let (_open, _rx_open) = registry.connect(user);
        let (_gone, rx_gone) = registry.connect(user);
        drop(rx_gone);

        assert_eq!(registry.deliver(user, &message_event(1, 2)), 1);
        assert_eq!(registry.connection_count(user), 1);
        assert_eq!(registry.total_connections(), 1);
    }

    #[test]
    fn test_full_buffer_drops_without_pruning() {
        let registry = ConnectionRegistry::with_buffer(1);
        let user = Snowflake::new(2);
        let (_id, _rx) = registry.connect(user);

        assert_eq!(registry.deliver(user, &message_event(1, 2)), 1);
        assert_eq!(registry.deliver(user, &message_event(1, 2)), 0);
        assert_eq!(registry.connection_count(user), 1);
    }

    #[tokio::test]
    async fn test_sequence_increases() {
        let registry = ConnectionRegistry::new();
        let user = Snowflake::new(2);
        let (_id, mut rx) = registry.connect(user);

        registry.deliver(user, &message_event(1, 2));
        registry.deliver(user, &message_event(1, 2));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert!(second.s > first.s);
    }

    #[test]
    fn test_cleanup_closed_connections() {
        let registry = ConnectionRegistry::new();
        let (_a, rx_a) = registry.connect(Snowflake::new(1));
        let (_b, _rx_b) = registry.connect(Snowflake::new(2));
        drop(rx_a);

        assert_eq!(registry.cleanup_closed_connections(), 1);
        assert_eq!(registry.user_count(), 1);
    }
}
