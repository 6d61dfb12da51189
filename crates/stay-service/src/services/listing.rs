//! Listing intake and moderation

use rust_decimal::Decimal;
use stay_core::entities::{Actor, Capacity, Listing, Location};
use stay_core::{DomainError, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CreateListingRequest, ListingResponse, RejectListingRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Listing service
pub struct ListingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ListingService<'a> {
    /// Create a new ListingService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Submit a listing; it stays out of search until approved
    #[instrument(skip(self, request), fields(owner_id = %owner_id))]
    pub async fn create_listing(
        &self,
        owner_id: Snowflake,
        request: CreateListingRequest,
    ) -> ServiceResult<ListingResponse> {
        request.validate()?;
        if request.price_per_night <= Decimal::ZERO {
            return Err(ServiceError::validation("price_per_night must be positive"));
        }

        let location = Location {
            address: request.location.address,
            town: request.location.town,
            district: request.location.district,
            state: request.location.state,
            pincode: request.location.pincode,
        };
        let capacity = Capacity {
            max_guests: request.capacity.max_guests,
            bedrooms: request.capacity.bedrooms,
            beds: request.capacity.beds,
            bathrooms: request.capacity.bathrooms,
        };
        let listing = Listing::new(
            self.ctx.generate_id(),
            owner_id,
            request.title,
            request.description,
            location,
            capacity,
            request.price_per_night,
            request.photos,
        );
        self.ctx.listing_repo().create(&listing).await?;

        info!(listing_id = %listing.id, "Listing submitted for review");
        Ok(ListingResponse::from(listing))
    }

    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn approve_listing(
        &self,
        actor: &Actor,
        listing_id: Snowflake,
    ) -> ServiceResult<ListingResponse> {
        Self::require_admin(actor, "approve listings")?;

        let mut listing = self.load(listing_id).await?;
        listing.approve();
        self.ctx.listing_repo().update_verification(&listing).await?;

        info!(%listing_id, "Listing approved");
        self.ctx
            .notify(listing.owner_id, "Listing approved", &format!("{} is now live", listing.title))
            .await;
        Ok(ListingResponse::from(listing))
    }

    #[instrument(skip(self, request), fields(actor_id = %actor.id))]
    pub async fn reject_listing(
        &self,
        actor: &Actor,
        listing_id: Snowflake,
        request: RejectListingRequest,
    ) -> ServiceResult<ListingResponse> {
        Self::require_admin(actor, "reject listings")?;
        request.validate()?;

        let mut listing = self.load(listing_id).await?;
        listing.reject(request.reason);
        self.ctx.listing_repo().update_verification(&listing).await?;

        info!(%listing_id, "Listing rejected");
        let body = format!(
            "{} was not approved: {}",
            listing.title,
            listing.rejection_reason.as_deref().unwrap_or_default()
        );
        self.ctx.notify(listing.owner_id, "Listing rejected", &body).await;
        Ok(ListingResponse::from(listing))
    }

    #[instrument(skip(self))]
    pub async fn get_listing(&self, listing_id: Snowflake) -> ServiceResult<ListingResponse> {
        self.load(listing_id).await.map(ListingResponse::from)
    }

    /// A host's own listings, including those pending review
    #[instrument(skip(self))]
    pub async fn listings_for_owner(&self, owner_id: Snowflake) -> ServiceResult<Vec<ListingResponse>> {
        let listings = self.ctx.listing_repo().find_by_owner(owner_id).await?;
        Ok(listings.into_iter().map(ListingResponse::from).collect())
    }

    fn require_admin(actor: &Actor, action: &str) -> ServiceResult<()> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::permission_denied(action))
        }
    }

    async fn load(&self, listing_id: Snowflake) -> ServiceResult<Listing> {
        self.ctx
            .listing_repo()
            .find_by_id(listing_id)
            .await?
            .ok_or_else(|| DomainError::ListingNotFound(listing_id).into())
    }
}
