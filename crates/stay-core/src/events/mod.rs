//! Domain events

mod domain_event;

pub use domain_event::{
    BookingCancelledEvent, BookingCreatedEvent, DomainEvent, MessageCreatedEvent,
};
