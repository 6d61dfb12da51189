//! Data transfer objects for service inputs and outputs
//!
//! This module provides:
//! - Request DTOs with validation
//! - Response DTOs for serializing results
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    AddReviewRequest, CancelBookingRequest, CapacityRequest, CreateBookingRequest,
    CreateListingRequest, CreatePaymentIntentRequest, LocationRequest, RejectListingRequest,
    SearchListingsRequest, SendMessageRequest,
};

pub use responses::{
    BookingResponse, ConversationResponse, ConversationSummaryResponse, ListingResponse,
    MessageResponse, PaymentIntentResponse, ReviewEligibilityResponse, ReviewResponse,
};
