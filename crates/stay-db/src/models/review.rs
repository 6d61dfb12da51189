//! Review database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for reviews table
#[derive(Debug, Clone, FromRow)]
pub struct ReviewModel {
    pub id: i64,
    pub listing_id: i64,
    pub author_id: i64,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
