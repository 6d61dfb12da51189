//! Test fixtures and data generators

use rust_decimal::Decimal;
use stay_core::{Actor, Snowflake};
use stay_service::dto::{CapacityRequest, CreateListingRequest, LocationRequest};
use std::sync::atomic::{AtomicI64, Ordering};

pub use stay_service::testing::{booking_request, date};

/// Counter for unique user ids
static USER_COUNTER: AtomicI64 = AtomicI64::new(10_000);

/// A fresh regular user
pub fn new_user() -> Actor {
    Actor::user(Snowflake::new(USER_COUNTER.fetch_add(1, Ordering::SeqCst)))
}

/// A fresh administrator
pub fn new_admin() -> Actor {
    Actor::admin(Snowflake::new(USER_COUNTER.fetch_add(1, Ordering::SeqCst)))
}

/// Listing submission for `town` at `price` per night, sleeping four
pub fn listing_request(town: &str, price: i64) -> CreateListingRequest {
    CreateListingRequest {
        title: format!("Homestay in {town}"),
        description: "Quiet rooms near the backwaters".to_string(),
        location: LocationRequest {
            address: "4 Canal Street".to_string(),
            town: town.to_string(),
            district: "Alappuzha".to_string(),
            state: "Kerala".to_string(),
            pincode: Some("688001".to_string()),
        },
        capacity: CapacityRequest {
            max_guests: 4,
            bedrooms: 2,
            beds: 2,
            bathrooms: 1,
        },
        price_per_night: Decimal::new(price, 0),
        photos: vec!["https://cdn.example.com/front.jpg".to_string()],
    }
}
