//! Gateway message format
//!
//! Every event pushed to a connection is wrapped in a dispatch envelope:
//! `{"t": "<EVENT_TYPE>", "s": <sequence>, "d": {...}}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stay_core::DomainEvent;

/// Dispatch envelope sent to a live connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayMessage {
    /// Event type
    pub t: String,

    /// Registry-wide sequence number
    pub s: u64,

    /// Event payload
    pub d: Value,
}

impl GatewayMessage {
    /// Wrap a domain event for dispatch
    pub fn dispatch(event: &DomainEvent, sequence: u64) -> Result<Self, serde_json::Error> {
        Ok(Self {
            t: event.event_type().to_string(),
            s: sequence,
            d: serde_json::to_value(event)?,
        })
    }

    /// Recover the domain event carried in `d`
    pub fn event(&self) -> Result<DomainEvent, serde_json::Error> {
        serde_json::from_value(self.d.clone())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
