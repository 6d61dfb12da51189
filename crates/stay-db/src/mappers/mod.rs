//! Entity to model mappers
//!
//! - `From<Model>`/`TryFrom<Model>` for entities: database rows to domain objects
//! - `*Insert` structs: entity data prepared for insertion

mod booking;
mod conversation;
mod listing;
mod message;
mod review;

pub use booking::bookings_from_models;
pub use conversation::assemble_conversations;
pub use listing::ListingInsert;
pub use message::MessageInsert;
