//! Listing reviews, open to guests with a Booked or Completed stay

use stay_core::entities::Review;
use stay_core::{DomainError, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{AddReviewRequest, ReviewEligibilityResponse, ReviewResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Review service
pub struct ReviewService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReviewService<'a> {
    /// Create a new ReviewService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn can_review(
        &self,
        user_id: Snowflake,
        listing_id: Snowflake,
    ) -> ServiceResult<ReviewEligibilityResponse> {
        let has_stay = self.ctx.booking_repo().has_stay(user_id, listing_id).await?;
        let can_review = has_stay && !self.ctx.review_repo().exists(user_id, listing_id).await?;
        Ok(ReviewEligibilityResponse { can_review })
    }

    #[instrument(skip(self, request))]
    pub async fn add_review(
        &self,
        user_id: Snowflake,
        listing_id: Snowflake,
        request: AddReviewRequest,
    ) -> ServiceResult<ReviewResponse> {
        request.validate()?;
        self.ctx
            .listing_repo()
            .find_by_id(listing_id)
            .await?
            .ok_or(DomainError::ListingNotFound(listing_id))?;

        if !self.ctx.booking_repo().has_stay(user_id, listing_id).await? {
            return Err(ServiceError::invalid_state(
                "only guests who booked this listing can review it",
            ));
        }

        let review = Review::new(
            self.ctx.generate_id(),
            listing_id,
            user_id,
            request.rating,
            request.comment,
        )?;
        self.ctx.review_repo().create(&review).await?;

        info!(review_id = %review.id, rating = review.rating, "Review added");
        Ok(ReviewResponse::from(review))
    }

    /// Reviews of a listing, newest first
    #[instrument(skip(self))]
    pub async fn list_reviews(&self, listing_id: Snowflake) -> ServiceResult<Vec<ReviewResponse>> {
        let reviews = self.ctx.review_repo().find_by_listing(listing_id).await?;
        Ok(reviews.into_iter().map(ReviewResponse::from).collect())
    }
}
