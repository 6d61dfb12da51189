//! # stay-db
//!
//! Database layer implementing the stay-core repository traits.
//!
//! - Connection pool management and migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - PostgreSQL repositories
//! - In-memory repositories with the same contracts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stay_db::{create_pool, PgBookingRepository, PoolConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::default()).await?;
//!     let bookings = PgBookingRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{
    InMemoryBookingRepository, InMemoryConversationRepository, InMemoryListingRepository,
    InMemoryReviewRepository,
};
pub use pool::{create_pool, default_migrations_dir, run_migrations, PgPool, PoolConfig};
pub use repositories::{
    PgBookingRepository, PgConversationRepository, PgListingRepository, PgReviewRepository,
};
