//! Ports implemented by the infrastructure layer

mod ports;
mod repositories;

pub use ports::{
    EventSink, MediaStorage, Notifier, PaymentError, PaymentGateway, PaymentIntent,
    RefundReceipt, TokenError, TokenVerifier,
};
pub use repositories::{
    BookingRepository, ConversationRepository, ListingQuery, ListingRepository, RepoResult,
    ReviewRepository,
};
