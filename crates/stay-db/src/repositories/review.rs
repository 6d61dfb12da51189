//! PostgreSQL implementation of ReviewRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use stay_core::entities::Review;
use stay_core::error::DomainError;
use stay_core::traits::{RepoResult, ReviewRepository};
use stay_core::value_objects::Snowflake;

use crate::models::ReviewModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of ReviewRepository
#[derive(Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    /// Create a new PgReviewRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    #[instrument(skip(self))]
    async fn exists(&self, author_id: Snowflake, listing_id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE author_id = $1 AND listing_id = $2)",
        )
        .bind(author_id.into_inner())
        .bind(listing_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, review), fields(review_id = %review.id))]
    async fn create(&self, review: &Review) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO reviews (id, listing_id, author_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(review.id.into_inner())
        .bind(review.listing_id.into_inner())
        .bind(review.author_id.into_inner())
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::ReviewAlreadyExists))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_listing(&self, listing_id: Snowflake) -> RepoResult<Vec<Review>> {
        let results = sqlx::query_as::<_, ReviewModel>(
            r"
            SELECT id, listing_id, author_id, rating, comment, created_at
            FROM reviews
            WHERE listing_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(listing_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Review::from).collect())
    }
}
