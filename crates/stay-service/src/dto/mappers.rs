//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use stay_core::entities::{Booking, Conversation, Listing, Message, Review};
use stay_core::PaymentIntent;

use super::responses::{
    BookingResponse, ConversationResponse, ListingResponse, MessageResponse,
    PaymentIntentResponse, ReviewResponse,
};

// ============================================================================
// Listing Mappers
// ============================================================================

impl From<&Listing> for ListingResponse {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id,
            owner_id: listing.owner_id,
            title: listing.title.clone(),
            description: listing.description.clone(),
            location: listing.location.clone(),
            capacity: listing.capacity,
            price_per_night: listing.price_per_night,
            photos: listing.photos.clone(),
            is_verified: listing.is_verified,
            rejection_reason: listing.rejection_reason.clone(),
            created_at: listing.created_at,
        }
    }
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self::from(&listing)
    }
}

// ============================================================================
// Booking Mappers
// ============================================================================

impl From<&Booking> for BookingResponse {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            listing_id: booking.listing_id,
            guest_id: booking.guest_id,
            check_in: booking.stay.check_in(),
            check_out: booking.stay.check_out(),
            nights: booking.stay.nights(),
            guests: booking.guests,
            total_price: booking.total_price,
            payment_intent_id: booking.payment_intent_id.clone(),
            status: booking.status,
            is_cancelled: booking.is_cancelled(),
            booked_at: booking.booked_at,
            cancelled_at: booking.cancelled_at,
            cancellation_reason: booking.cancellation_reason.clone(),
            refund_status: booking.refund_status,
            refund_id: booking.refund_id.clone(),
        }
    }
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self::from(&booking)
    }
}

impl From<PaymentIntent> for PaymentIntentResponse {
    fn from(intent: PaymentIntent) -> Self {
        Self {
            id: intent.id,
            client_secret: intent.client_secret,
            amount_minor: intent.amount_minor,
            currency: intent.currency,
        }
    }
}

// ============================================================================
// Messaging Mappers
// ============================================================================

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content,
            kind: message.kind,
            created_at: message.created_at,
        }
    }
}

impl From<&Conversation> for ConversationResponse {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id,
            participants: [conversation.participants.low(), conversation.participants.high()],
            message_count: conversation.message_ids.len(),
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }
}

// ============================================================================
// Review Mappers
// ============================================================================

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            listing_id: review.listing_id,
            author_id: review.author_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}
