//! Response DTOs
//!
//! All response DTOs implement `Serialize`. Snowflake IDs serialize as strings.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use stay_core::{
    BookingStatus, Capacity, Location, MessageKind, RefundStatus, Snowflake,
};

#[derive(Debug, Clone, Serialize)]
pub struct ListingResponse {
    pub id: Snowflake,
    pub owner_id: Snowflake,
    pub title: String,
    pub description: String,
    pub location: Location,
    pub capacity: Capacity,
    pub price_per_night: Decimal,
    pub photos: Vec<String>,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    pub id: Snowflake,
    pub listing_id: Snowflake,
    pub guest_id: Snowflake,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub guests: i32,
    pub total_price: Decimal,
    pub payment_intent_id: String,
    pub status: BookingStatus,
    pub is_cancelled: bool,
    pub booked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub refund_status: RefundStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntentResponse {
    pub id: String,
    pub client_secret: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub receiver_id: Snowflake,
    pub content: String,
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub id: Snowflake,
    pub participants: [Snowflake; 2],
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of a user's inbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSummaryResponse {
    pub conversation_id: Snowflake,
    pub other_participant_id: Snowflake,
    /// The requesting user's own unread count
    pub unread_count: i32,
    pub last_message_id: Option<Snowflake>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub id: Snowflake,
    pub listing_id: Snowflake,
    pub author_id: Snowflake,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReviewEligibilityResponse {
    pub can_review: bool,
}
