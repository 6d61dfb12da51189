//! # stay-gateway
//!
//! Tracks the live connections of each user and pushes domain events to them.
//! Services reach the registry only through the `EventSink` port.

pub mod connection;
pub mod protocol;

pub use connection::{Connection, ConnectionId, ConnectionRegistry};
pub use protocol::GatewayMessage;
