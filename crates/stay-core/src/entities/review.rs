//! Review entity

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

pub const MAX_REVIEW_COMMENT_LENGTH: usize = 500;

/// A guest's rating of a listing, one per author and listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: Snowflake,
    pub listing_id: Snowflake,
    pub author_id: Snowflake,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        id: Snowflake,
        listing_id: Snowflake,
        author_id: Snowflake,
        rating: i16,
        comment: String,
    ) -> Result<Self, DomainError> {
        if !(1..=5).contains(&rating) {
            return Err(DomainError::ValidationError(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        if comment.chars().count() > MAX_REVIEW_COMMENT_LENGTH {
            return Err(DomainError::ContentTooLong {
                max: MAX_REVIEW_COMMENT_LENGTH,
            });
        }
        Ok(Self {
            id,
            listing_id,
            author_id,
            rating,
            comment,
            created_at: Utc::now(),
        })
    }
}
