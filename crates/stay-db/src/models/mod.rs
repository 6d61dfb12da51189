//! Database models with SQLx `FromRow` derives

mod booking;
mod conversation;
mod listing;
mod message;
mod review;

pub use booking::BookingModel;
pub use conversation::{ConversationModel, MessageRefModel, UnreadModel};
pub use listing::ListingModel;
pub use message::MessageModel;
pub use review::ReviewModel;
