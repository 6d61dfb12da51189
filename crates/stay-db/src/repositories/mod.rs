//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in stay-core.

mod booking;
mod conversation;
mod error;
mod listing;
mod review;

pub use booking::PgBookingRepository;
pub use conversation::PgConversationRepository;
pub use listing::PgListingRepository;
pub use review::PgReviewRepository;
