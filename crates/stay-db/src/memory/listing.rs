//! In-memory implementation of ListingRepository

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use stay_core::entities::Listing;
use stay_core::error::DomainError;
use stay_core::traits::{ListingQuery, ListingRepository, RepoResult};
use stay_core::value_objects::Snowflake;

#[derive(Default)]
pub struct InMemoryListingRepository {
    listings: RwLock<HashMap<Snowflake, Listing>>,
}

impl InMemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(listings: &mut [Listing]) {
    listings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Listing>> {
        Ok(self.listings.read().get(&id).cloned())
    }

    async fn search(&self, query: &ListingQuery) -> RepoResult<Vec<Listing>> {
        let mut found: Vec<Listing> = self
            .listings
            .read()
            .values()
            .filter(|l| l.is_verified)
            .filter(|l| {
                query
                    .location
                    .as_deref()
                    .map_or(true, |text| l.location.matches(text))
            })
            .filter(|l| query.guests.map_or(true, |g| l.capacity.max_guests >= g))
            .cloned()
            .collect();
        newest_first(&mut found);
        Ok(found)
    }

    async fn find_by_owner(&self, owner_id: Snowflake) -> RepoResult<Vec<Listing>> {
        let mut found: Vec<Listing> = self
            .listings
            .read()
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect();
        newest_first(&mut found);
        Ok(found)
    }

    async fn create(&self, listing: &Listing) -> RepoResult<()> {
        let mut listings = self.listings.write();
        if listings.contains_key(&listing.id) {
            return Err(DomainError::DatabaseError(format!(
                "duplicate listing id {}",
                listing.id
            )));
        }
        listings.insert(listing.id, listing.clone());
        Ok(())
    }

    async fn update_verification(&self, listing: &Listing) -> RepoResult<()> {
        let mut listings = self.listings.write();
        let stored = listings
            .get_mut(&listing.id)
            .ok_or(DomainError::ListingNotFound(listing.id))?;
        stored.is_verified = listing.is_verified;
        stored.rejection_reason.clone_from(&listing.rejection_reason);
        stored.updated_at = listing.updated_at;
        Ok(())
    }
}
