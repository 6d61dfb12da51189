//! Domain entities - core business objects

mod actor;
mod booking;
mod conversation;
mod listing;
mod message;
mod review;

pub use actor::{Actor, ActorRole};
pub use booking::{Booking, BookingStatus, RefundStatus};
pub use conversation::{Conversation, ParticipantPair};
pub use listing::{Capacity, Listing, Location};
pub use message::{Message, MessageKind, MAX_MESSAGE_LENGTH};
pub use review::{Review, MAX_REVIEW_COMMENT_LENGTH};
