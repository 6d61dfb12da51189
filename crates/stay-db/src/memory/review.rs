//! In-memory implementation of ReviewRepository

use async_trait::async_trait;
use parking_lot::RwLock;

use stay_core::entities::Review;
use stay_core::error::DomainError;
use stay_core::traits::{RepoResult, ReviewRepository};
use stay_core::value_objects::Snowflake;

#[derive(Default)]
pub struct InMemoryReviewRepository {
    reviews: RwLock<Vec<Review>>,
}

impl InMemoryReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn exists(&self, author_id: Snowflake, listing_id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .reviews
            .read()
            .iter()
            .any(|r| r.author_id == author_id && r.listing_id == listing_id))
    }

    async fn create(&self, review: &Review) -> RepoResult<()> {
        let mut reviews = self.reviews.write();
        if reviews
            .iter()
            .any(|r| r.author_id == review.author_id && r.listing_id == review.listing_id)
        {
            return Err(DomainError::ReviewAlreadyExists);
        }
        reviews.push(review.clone());
        Ok(())
    }

    async fn find_by_listing(&self, listing_id: Snowflake) -> RepoResult<Vec<Review>> {
        let mut found: Vec<Review> = self
            .reviews
            .read()
            .iter()
            .filter(|r| r.listing_id == listing_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }
}
