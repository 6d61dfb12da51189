//! PostgreSQL implementation of ListingRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use stay_core::entities::Listing;
use stay_core::error::DomainError;
use stay_core::traits::{ListingQuery, ListingRepository, RepoResult};
use stay_core::value_objects::Snowflake;

use crate::mappers::ListingInsert;
use crate::models::ListingModel;

use super::error::{like_pattern, map_db_error};

/// PostgreSQL implementation of ListingRepository
#[derive(Clone)]
pub struct PgListingRepository {
    pool: PgPool,
}

impl PgListingRepository {
    /// Create a new PgListingRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingRepository for PgListingRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Listing>> {
        let result = sqlx::query_as::<_, ListingModel>(
            r"
            SELECT id, owner_id, title, description, address, town, district, state, pincode,
                   max_guests, bedrooms, beds, bathrooms, price_per_night, photos,
                   is_verified, rejection_reason, created_at, updated_at
            FROM listings
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Listing::from))
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &ListingQuery) -> RepoResult<Vec<Listing>> {
        let location = query
            .location
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .map(like_pattern);

        let results = sqlx::query_as::<_, ListingModel>(
            r"
            SELECT id, owner_id, title, description, address, town, district, state, pincode,
                   max_guests, bedrooms, beds, bathrooms, price_per_night, photos,
                   is_verified, rejection_reason, created_at, updated_at
            FROM listings
            WHERE is_verified
              AND ($1::TEXT IS NULL OR town ILIKE $1 OR district ILIKE $1 OR state ILIKE $1)
              AND ($2::INTEGER IS NULL OR max_guests >= $2)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(location)
        .bind(query.guests)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Listing::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_owner(&self, owner_id: Snowflake) -> RepoResult<Vec<Listing>> {
        let results = sqlx::query_as::<_, ListingModel>(
            r"
            SELECT id, owner_id, title, description, address, town, district, state, pincode,
                   max_guests, bedrooms, beds, bathrooms, price_per_night, photos,
                   is_verified, rejection_reason, created_at, updated_at
            FROM listings
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(owner_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Listing::from).collect())
    }

    #[instrument(skip(self, listing), fields(listing_id = %listing.id))]
    async fn create(&self, listing: &Listing) -> RepoResult<()> {
        let insert = ListingInsert::new(listing);

        sqlx::query(
            r"
            INSERT INTO listings (id, owner_id, title, description, address, town, district,
                                  state, pincode, max_guests, bedrooms, beds, bathrooms,
                                  price_per_night, photos, is_verified, rejection_reason,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    FALSE, NULL, $16, $16)
            ",
        )
        .bind(insert.id)
        .bind(insert.owner_id)
        .bind(insert.title)
        .bind(insert.description)
        .bind(&insert.location.address)
        .bind(&insert.location.town)
        .bind(&insert.location.district)
        .bind(&insert.location.state)
        .bind(insert.location.pincode.as_deref())
        .bind(insert.capacity.max_guests)
        .bind(insert.capacity.bedrooms)
        .bind(insert.capacity.beds)
        .bind(insert.capacity.bathrooms)
        .bind(insert.price_per_night)
        .bind(insert.photos)
        .bind(listing.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, listing), fields(listing_id = %listing.id))]
    async fn update_verification(&self, listing: &Listing) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE listings
            SET is_verified = $2, rejection_reason = $3, updated_at = $4
            WHERE id = $1
            ",
        )
        .bind(listing.id.into_inner())
        .bind(listing.is_verified)
        .bind(listing.rejection_reason.as_deref())
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ListingNotFound(listing.id));
        }

        Ok(())
    }
}
