//! In-memory repositories
//!
//! Same contracts as the PostgreSQL repositories, backed by `parking_lot`
//! locks. Used by tests and by local runs without a database.

mod booking;
mod conversation;
mod listing;
mod review;

pub use booking::InMemoryBookingRepository;
pub use conversation::InMemoryConversationRepository;
pub use listing::InMemoryListingRepository;
pub use review::InMemoryReviewRepository;
