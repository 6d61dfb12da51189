//! Connection tracking

mod connection;
mod registry;

pub use connection::{Connection, ConnectionId};
pub use registry::ConnectionRegistry;
