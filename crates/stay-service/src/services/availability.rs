//! Availability engine
//!
//! Read-only answers to "is this listing free for these nights" and
//! verified-listing search with an optional stay filter.

use std::collections::HashSet;

use chrono::NaiveDate;
use stay_core::traits::ListingQuery;
use stay_core::{Snowflake, StayRange};
use tracing::{debug, instrument};
use validator::Validate;

use crate::dto::{ListingResponse, SearchListingsRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Availability service
pub struct AvailabilityService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AvailabilityService<'a> {
    /// Create a new AvailabilityService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Whether no Booked or Completed reservation on the listing overlaps
    /// `[check_in, check_out)`
    #[instrument(skip(self))]
    pub async fn is_available(
        &self,
        listing_id: Snowflake,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> ServiceResult<bool> {
        let stay = StayRange::new(check_in, check_out)?;
        self.is_available_for(listing_id, &stay).await
    }

    pub(crate) async fn is_available_for(
        &self,
        listing_id: Snowflake,
        stay: &StayRange,
    ) -> ServiceResult<bool> {
        let taken = self.ctx.booking_repo().has_overlap(listing_id, stay).await?;
        Ok(!taken)
    }

    /// Verified listings matching location and guest count, minus those
    /// booked for an overlapping stay when one is given
    #[instrument(skip(self))]
    pub async fn search_listings(
        &self,
        request: SearchListingsRequest,
    ) -> ServiceResult<Vec<ListingResponse>> {
        request.validate()?;

        let stay = match (request.check_in, request.check_out) {
            (Some(check_in), Some(check_out)) => Some(StayRange::new(check_in, check_out)?),
            (None, None) => None,
            _ => {
                return Err(ServiceError::validation(
                    "check_in and check_out must be given together",
                ))
            }
        };

        let query = ListingQuery {
            location: request.location.filter(|l| !l.trim().is_empty()),
            guests: request.guests,
        };
        let mut listings = self.ctx.listing_repo().search(&query).await?;

        if let Some(stay) = stay {
            let booked: HashSet<Snowflake> = self
                .ctx
                .booking_repo()
                .overlapping_listing_ids(&stay)
                .await?
                .into_iter()
                .collect();
            listings.retain(|l| !booked.contains(&l.id));
        }

        debug!(results = listings.len(), "Listing search complete");
        Ok(listings.into_iter().map(ListingResponse::from).collect())
    }
}
