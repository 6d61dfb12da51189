//! Integration test utilities for the booking platform
//!
//! Scenarios run the real services over in-memory repositories, a scripted
//! payment gateway and a live connection registry.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
