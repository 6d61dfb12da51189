//! Listing entity <-> model mapper

use rust_decimal::Decimal;
use stay_core::entities::{Capacity, Listing, Location};
use stay_core::value_objects::Snowflake;

use crate::models::ListingModel;

/// Convert ListingModel to Listing entity
impl From<ListingModel> for Listing {
    fn from(model: ListingModel) -> Self {
        Listing {
            id: Snowflake::new(model.id),
            owner_id: Snowflake::new(model.owner_id),
            title: model.title,
            description: model.description,
            location: Location {
                address: model.address,
                town: model.town,
                district: model.district,
                state: model.state,
                pincode: model.pincode,
            },
            capacity: Capacity {
                max_guests: model.max_guests,
                bedrooms: model.bedrooms,
                beds: model.beds,
                bathrooms: model.bathrooms,
            },
            price_per_night: model.price_per_night,
            photos: model.photos,
            is_verified: model.is_verified,
            rejection_reason: model.rejection_reason,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Listing values for database insertion
pub struct ListingInsert<'a> {
    pub id: i64,
    pub owner_id: i64,
    pub title: &'a str,
    pub description: &'a str,
    pub location: &'a Location,
    pub capacity: Capacity,
    pub price_per_night: Decimal,
    pub photos: &'a [String],
}

impl<'a> ListingInsert<'a> {
    pub fn new(listing: &'a Listing) -> Self {
        Self {
            id: listing.id.into_inner(),
            owner_id: listing.owner_id.into_inner(),
            title: &listing.title,
            description: &listing.description,
            location: &listing.location,
            capacity: listing.capacity,
            price_per_night: listing.price_per_night,
            photos: &listing.photos,
        }
    }
}
