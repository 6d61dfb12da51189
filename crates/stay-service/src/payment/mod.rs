//! Payment coordination: minor-unit conversion, retry policy, Stripe client

pub mod coordinator;
pub mod retry;
pub mod stripe;

pub use coordinator::PaymentCoordinator;
pub use retry::{retry_if, RetryPolicy};
pub use stripe::StripeGateway;
