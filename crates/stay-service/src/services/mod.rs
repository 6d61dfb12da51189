//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod availability;
pub mod booking;
pub mod context;
pub mod error;
pub mod listing;
pub mod messaging;
pub mod review;
pub mod sweep;

// Re-export all services for convenience
pub use availability::AvailabilityService;
pub use booking::BookingService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use listing::ListingService;
pub use messaging::MessagingService;
pub use review::ReviewService;
pub use sweep::{run_sweep_loop, SweepService};
