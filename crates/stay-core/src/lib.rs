//! # stay-core
//!
//! Domain layer containing entities, value objects, repository and collaborator
//! ports, and domain events. No dependencies on infrastructure.

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Actor, ActorRole, Booking, BookingStatus, Capacity, Conversation, Listing, Location,
    Message, MessageKind, ParticipantPair, RefundStatus, Review, MAX_MESSAGE_LENGTH,
    MAX_REVIEW_COMMENT_LENGTH,
};
pub use error::DomainError;
pub use events::DomainEvent;
pub use traits::{
    BookingRepository, ConversationRepository, EventSink, ListingQuery, ListingRepository,
    MediaStorage, Notifier, PaymentError, PaymentGateway, PaymentIntent, RefundReceipt,
    RepoResult, ReviewRepository, TokenError, TokenVerifier,
};
pub use value_objects::{
    to_minor_units, Snowflake, SnowflakeGenerator, SnowflakeParseError, StayRange,
};
