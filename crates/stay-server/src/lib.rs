//! # stay-server
//!
//! Wires the PostgreSQL repositories, payment provider, media storage and
//! connection registry into a `ServiceContext`, and runs the completion
//! sweep until shutdown.

pub mod server;
pub mod state;

pub use server::{create_app_state, run};
pub use state::AppState;
