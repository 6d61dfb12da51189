//! Listing entity - a bookable accommodation owned by a host

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Where a listing is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub town: String,
    pub district: String,
    pub state: String,
    pub pincode: Option<String>,
}

impl Location {
    /// Case-insensitive substring match against town, district or state
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.town, &self.district, &self.state]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// How many people and beds a listing holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub max_guests: i32,
    pub bedrooms: i32,
    pub beds: i32,
    pub bathrooms: i32,
}

/// Listing entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub id: Snowflake,
    pub owner_id: Snowflake,
    pub title: String,
    pub description: String,
    pub location: Location,
    pub capacity: Capacity,
    pub price_per_night: Decimal,
    pub photos: Vec<String>,
    pub is_verified: bool,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Create a listing awaiting moderation
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Snowflake,
        owner_id: Snowflake,
        title: String,
        description: String,
        location: Location,
        capacity: Capacity,
        price_per_night: Decimal,
        photos: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id,
            title,
            description,
            location,
            capacity,
            price_per_night,
            photos,
            is_verified: false,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn can_host(&self, guests: i32) -> bool {
        guests >= 1 && guests <= self.capacity.max_guests
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }

    pub fn approve(&mut self) {
        self.is_verified = true;
        self.rejection_reason = None;
        self.updated_at = Utc::now();
    }

    pub fn reject(&mut self, reason: String) {
        self.is_verified = false;
        self.rejection_reason = Some(reason);
        self.updated_at = Utc::now();
    }

    /// Price of `nights` nights at the listed rate
    pub fn price_for(&self, nights: i64) -> Decimal {
        self.price_per_night * Decimal::from(nights)
    }
}
