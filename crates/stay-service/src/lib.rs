//! # stay-service
//!
//! Application layer containing the booking, payment, messaging, review and
//! listing use cases, their DTOs, and the adapters for outbound collaborators.

pub mod adapters;
pub mod dto;
pub mod payment;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use adapters::{LocalMediaStorage, TracingNotifier};
pub use payment::{PaymentCoordinator, RetryPolicy, StripeGateway};
pub use services::{
    run_sweep_loop, AvailabilityService, BookingService, ListingService, MessagingService,
    ReviewService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    SweepService,
};
