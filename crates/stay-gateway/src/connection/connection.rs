//! A single live connection of a user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use stay_core::Snowflake;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use crate::protocol::GatewayMessage;

/// Registry-assigned connection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sending half of a connection; the receiving half belongs to the transport
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    user_id: Snowflake,
    sender: mpsc::Sender<GatewayMessage>,
    connected_at: DateTime<Utc>,
}

impl Connection {
    pub(crate) fn new(user_id: Snowflake, sender: mpsc::Sender<GatewayMessage>) -> Self {
        Self {
            id: ConnectionId::new(),
            user_id,
            sender,
            connected_at: Utc::now(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> Snowflake {
        self.user_id
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// True once the receiver has been dropped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Queue a message without waiting for buffer space
    pub fn try_send(&self, message: GatewayMessage) -> Result<(), TrySendError<GatewayMessage>> {
        self.sender.try_send(message)
    }
}
