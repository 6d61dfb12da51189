//! Review entity <-> model mapper

use stay_core::entities::Review;
use stay_core::value_objects::Snowflake;

use crate::models::ReviewModel;

impl From<ReviewModel> for Review {
    fn from(model: ReviewModel) -> Self {
        Review {
            id: Snowflake::new(model.id),
            listing_id: Snowflake::new(model.listing_id),
            author_id: Snowflake::new(model.author_id),
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at,
        }
    }
}
