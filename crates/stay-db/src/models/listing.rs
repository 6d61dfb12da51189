//! Listing database model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Database model for listings table
#[derive(Debug, Clone, FromRow)]
pub struct ListingModel {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub address: String,
    pub town: String,
    pub district: String,
    pub state: String,
    pub pincode: Option<String>,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub beds: i32,
    pub bathrooms: i32,
    pub price_per_night: Decimal,
    pub photos: Vec<String>,
    pub is_verified: bool,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
