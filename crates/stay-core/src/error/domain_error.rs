//! Domain errors - error types for the domain layer

use chrono::NaiveDate;
use thiserror::Error;

use crate::entities::BookingStatus;
use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Listing not found: {0}")]
    ListingNotFound(Snowflake),

    #[error("Booking not found: {0}")]
    BookingNotFound(Snowflake),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Check-in {check_in} must be before check-out {check_out}")]
    InvalidDateRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Listing hosts at most {max} guests, {requested} requested")]
    GuestCapacityExceeded { requested: i32, max: i32 },

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Listing {listing_id} is already booked for an overlapping stay")]
    BookingConflict { listing_id: Snowflake },

    #[error("Listing already reviewed by this user")]
    ReviewAlreadyExists,

    // =========================================================================
    // State Errors
    // =========================================================================
    #[error("Booking {booking_id} is {status} and cannot be {action}")]
    InvalidBookingState {
        booking_id: Snowflake,
        status: BookingStatus,
        action: &'static str,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    #[error("Payment provider error: {0}")]
    PaymentProvider(String),

    #[error("Media storage error: {0}")]
    MediaStorage(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Stable error code for outer surfaces
    pub fn code(&self) -> &'static str {
        match self {
            Self::ListingNotFound(_) => "UNKNOWN_LISTING",
            Self::BookingNotFound(_) => "UNKNOWN_BOOKING",
            Self::ConversationNotFound(_) => "UNKNOWN_CONVERSATION",

            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::GuestCapacityExceeded { .. } => "GUEST_CAPACITY_EXCEEDED",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",

            Self::BookingConflict { .. } => "BOOKING_CONFLICT",
            Self::ReviewAlreadyExists => "REVIEW_ALREADY_EXISTS",

            Self::InvalidBookingState { .. } | Self::InvalidState(_) => "INVALID_STATE",

            Self::PaymentProvider(_) => "PAYMENT_PROVIDER_ERROR",
            Self::MediaStorage(_) => "MEDIA_STORAGE_ERROR",

            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ListingNotFound(_) | Self::BookingNotFound(_) | Self::ConversationNotFound(_)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidDateRange { .. }
                | Self::GuestCapacityExceeded { .. }
                | Self::ContentTooLong { .. }
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::BookingConflict { .. } | Self::ReviewAlreadyExists)
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidBookingState { .. } | Self::InvalidState(_))
    }

    pub fn is_payment_provider(&self) -> bool {
        matches!(self, Self::PaymentProvider(_))
    }
}
