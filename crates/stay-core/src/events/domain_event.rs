//! Domain events - emitted when domain state changes
//!
//! Events are pushed to the live connections of the users they concern.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Booking, Message, MessageKind, RefundStatus};
use crate::value_objects::Snowflake;

/// All possible domain events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    // =========================================================================
    // Booking Events
    // =========================================================================
    BookingCreated(BookingCreatedEvent),
    BookingCancelled(BookingCancelledEvent),

    // =========================================================================
    // Message Events
    // =========================================================================
    MessageCreated(MessageCreatedEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::BookingCreated(_) => "BOOKING_CREATED",
            Self::BookingCancelled(_) => "BOOKING_CANCELLED",
            Self::MessageCreated(_) => "MESSAGE_CREATED",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::BookingCreated(e) => e.timestamp,
            Self::BookingCancelled(e) => e.timestamp,
            Self::MessageCreated(e) => e.timestamp,
        }
    }

    pub fn booking_created(booking: &Booking) -> Self {
        Self::BookingCreated(BookingCreatedEvent {
            booking_id: booking.id,
            listing_id: booking.listing_id,
            guest_id: booking.guest_id,
            check_in: booking.stay.check_in(),
            check_out: booking.stay.check_out(),
            timestamp: booking.booked_at,
        })
    }

    pub fn booking_cancelled(booking: &Booking) -> Self {
        Self::BookingCancelled(BookingCancelledEvent {
            booking_id: booking.id,
            listing_id: booking.listing_id,
            guest_id: booking.guest_id,
            refund_status: booking.refund_status,
            timestamp: booking.cancelled_at.unwrap_or_else(Utc::now),
        })
    }

    pub fn message_created(message: &Message) -> Self {
        Self::MessageCreated(MessageCreatedEvent {
            message_id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content.clone(),
            kind: message.kind,
            timestamp: message.created_at,
        })
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCreatedEvent {
    pub booking_id: Snowflake,
    pub listing_id: Snowflake,
    pub guest_id: Snowflake,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCancelledEvent {
    pub booking_id: Snowflake,
    pub listing_id: Snowflake,
    pub guest_id: Snowflake,
    pub refund_status: RefundStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCreatedEvent {
    pub message_id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub receiver_id: Snowflake,
    pub content: String,
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
}
