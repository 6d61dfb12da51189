//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::entities::{
    Booking, Conversation, Listing, Message, ParticipantPair, RefundStatus, Review,
};
use crate::error::DomainError;
use crate::value_objects::{Snowflake, StayRange};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Listing Repository
// ============================================================================

/// Filter for verified-listing searches
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    /// Case-insensitive substring of town, district or state
    pub location: Option<String>,
    /// Minimum `max_guests`
    pub guests: Option<i32>,
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Find listing by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Listing>>;

    /// Verified listings matching the query
    async fn search(&self, query: &ListingQuery) -> RepoResult<Vec<Listing>>;

    /// Listings owned by a host
    async fn find_by_owner(&self, owner_id: Snowflake) -> RepoResult<Vec<Listing>>;

    /// Create a new listing
    async fn create(&self, listing: &Listing) -> RepoResult<()>;

    /// Persist verification status and rejection reason
    async fn update_verification(&self, listing: &Listing) -> RepoResult<()>;
}

// ============================================================================
// Booking Repository
// ============================================================================

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Find booking by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Booking>>;

    /// Whether a Booked or Completed reservation on the listing overlaps `stay`
    async fn has_overlap(&self, listing_id: Snowflake, stay: &StayRange) -> RepoResult<bool>;

    /// Listing ids holding a Booked or Completed reservation overlapping `stay`
    async fn overlapping_listing_ids(&self, stay: &StayRange) -> RepoResult<Vec<Snowflake>>;

    /// Insert the booking unless it overlaps an existing Booked or Completed
    /// reservation on the same listing. Check and insert are one atomic step;
    /// an overlap yields `DomainError::BookingConflict`.
    async fn insert_if_available(&self, booking: &Booking) -> RepoResult<()>;

    /// Persist a cancellation only while the stored row is still Booked.
    /// Returns `false` when the row had already left the Booked state.
    async fn save_cancellation(&self, booking: &Booking) -> RepoResult<bool>;

    /// Record the refund outcome of a cancelled booking
    async fn update_refund(
        &self,
        id: Snowflake,
        status: RefundStatus,
        refund_id: Option<&str>,
    ) -> RepoResult<()>;

    /// Transition every Booked reservation with `check_out < as_of` to
    /// Completed. Returns the number of bookings changed.
    async fn complete_past_due(&self, as_of: NaiveDate) -> RepoResult<u64>;

    /// Bookings made by a guest, newest first
    async fn find_by_guest(&self, guest_id: Snowflake) -> RepoResult<Vec<Booking>>;

    /// Bookings on a listing ordered by check-in
    async fn find_by_listing(&self, listing_id: Snowflake) -> RepoResult<Vec<Booking>>;

    /// Whether the guest holds a Booked or Completed reservation on the listing
    async fn has_stay(&self, guest_id: Snowflake, listing_id: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// Conversation Repository
// ============================================================================

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find conversation by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Conversation>>;

    /// Find the conversation between two users
    async fn find_by_pair(&self, pair: &ParticipantPair) -> RepoResult<Option<Conversation>>;

    /// Return the conversation between two users, creating it with `new_id`
    /// if absent. Concurrent callers converge on one conversation.
    async fn get_or_create(
        &self,
        pair: &ParticipantPair,
        new_id: Snowflake,
    ) -> RepoResult<Conversation>;

    /// Conversations a user takes part in, most recently updated first
    async fn find_by_participant(&self, user_id: Snowflake) -> RepoResult<Vec<Conversation>>;

    /// Atomically get-or-create the conversation of the message's participants
    /// (using `new_conversation_id` if it must be created), store the message,
    /// append it and increment the receiver's unread counter.
    /// `message.conversation_id` is ignored; the stored message carries the
    /// resolved conversation id. Returns the stored message and the updated
    /// conversation.
    async fn append_message(
        &self,
        message: &Message,
        new_conversation_id: Snowflake,
    ) -> RepoResult<(Message, Conversation)>;

    /// Messages of a conversation, oldest first, with `user_id`'s unread
    /// counter reset to zero in the same atomic step. Serialised with
    /// `append_message` on the same conversation, so every message counted
    /// before the reset is in the returned history.
    async fn read_thread(
        &self,
        conversation_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Vec<Message>>;

    /// Messages of a conversation, oldest first
    async fn messages(&self, conversation_id: Snowflake) -> RepoResult<Vec<Message>>;
}

// ============================================================================
// Review Repository
// ============================================================================

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Whether the author has already reviewed the listing
    async fn exists(&self, author_id: Snowflake, listing_id: Snowflake) -> RepoResult<bool>;

    /// Create a review; a second review by the same author on the same
    /// listing yields `DomainError::ReviewAlreadyExists`
    async fn create(&self, review: &Review) -> RepoResult<()>;

    /// Reviews of a listing, newest first
    async fn find_by_listing(&self, listing_id: Snowflake) -> RepoResult<Vec<Review>>;
}
