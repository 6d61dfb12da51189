//! Request DTOs
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use stay_core::{MessageKind, Snowflake};
use validator::Validate;

// ============================================================================
// Listing Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LocationRequest {
    #[validate(length(min = 1, max = 200, message = "Address must be 1-200 characters"))]
    pub address: String,

    #[validate(length(min = 1, max = 100, message = "Town must be 1-100 characters"))]
    pub town: String,

    #[validate(length(min = 1, max = 100, message = "District must be 1-100 characters"))]
    pub district: String,

    #[validate(length(min = 1, max = 100, message = "State must be 1-100 characters"))]
    pub state: String,

    #[validate(length(min = 3, max = 12, message = "Pincode must be 3-12 characters"))]
    pub pincode: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct CapacityRequest {
    #[validate(range(min = 1, max = 100, message = "Listing must host 1-100 guests"))]
    pub max_guests: i32,

    #[validate(range(min = 0, max = 100))]
    pub bedrooms: i32,

    #[validate(range(min = 1, max = 100, message = "Listing needs at least one bed"))]
    pub beds: i32,

    #[validate(range(min = 0, max = 100))]
    pub bathrooms: i32,
}

/// New listing submitted by a host
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[validate(length(min = 1, max = 32, message = "Title must be 1-32 characters"))]
    pub title: String,

    #[validate(length(max = 400, message = "Description must be at most 400 characters"))]
    #[serde(default)]
    pub description: String,

    #[validate(nested)]
    pub location: LocationRequest,

    #[validate(nested)]
    pub capacity: CapacityRequest,

    /// Nightly price in major currency units
    pub price_per_night: Decimal,

    #[validate(length(max = 20, message = "At most 20 photos"))]
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RejectListingRequest {
    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: String,
}

/// Verified-listing search
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SearchListingsRequest {
    /// Town, district or state, matched case-insensitively
    #[validate(length(max = 100))]
    pub location: Option<String>,

    #[validate(range(min = 1, message = "Guests must be at least 1"))]
    pub guests: Option<i32>,

    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
}

// ============================================================================
// Booking Requests
// ============================================================================

/// Reservation after client-side payment confirmation
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub listing_id: Snowflake,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,

    #[validate(range(min = 1, message = "Guests must be at least 1"))]
    pub guests: i32,

    /// Total in major currency units
    pub total_price: Decimal,

    #[validate(length(min = 1, max = 255, message = "Payment intent id is required"))]
    pub payment_intent_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CancelBookingRequest {
    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentIntentRequest {
    /// Amount in major currency units
    pub amount: Decimal,
}

// ============================================================================
// Message Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub receiver_id: Snowflake,

    pub content: String,

    #[serde(default)]
    pub kind: MessageKind,
}

// ============================================================================
// Review Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,

    #[validate(length(max = 500, message = "Comment must be at most 500 characters"))]
    #[serde(default)]
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_booking_request_deserializes_string_ids() {
        let request: CreateBookingRequest = serde_json::from_value(json!({
            "listing_id": "123456789",
            "check_in": "2025-01-10",
            "check_out": "2025-01-12",
            "guests": 2,
            "total_price": "3001.00",
            "payment_intent_id": "pi_1"
        }))
        .unwrap();

        assert_eq!(request.listing_id, Snowflake::new(123_456_789));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_booking_request_requires_intent() {
        let request: CreateBookingRequest = serde_json::from_value(json!({
            "listing_id": "1",
            "check_in": "2025-01-10",
            "check_out": "2025-01-12",
            "guests": 0,
            "total_price": "10",
            "payment_intent_id": ""
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("guests"));
        assert!(fields.contains_key("payment_intent_id"));
    }

    #[test]
    fn test_listing_request_validates_nested() {
        let request: CreateListingRequest = serde_json::from_value(json!({
            "title": "Hill view cottage",
            "location": {
                "address": "2 Tea Estate Road",
                "town": "Munnar",
                "district": "Idukki",
                "state": "Kerala"
            },
            "capacity": { "max_guests": 0, "bedrooms": 1, "beds": 1, "bathrooms": 1 },
            "price_per_night": 2500
        }))
        .unwrap();

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_message_kind_defaults_to_text() {
        let request: SendMessageRequest = serde_json::from_value(json!({
            "receiver_id": "77",
            "content": "hello"
        }))
        .unwrap();
        assert_eq!(request.kind, MessageKind::Text);
    }
}
