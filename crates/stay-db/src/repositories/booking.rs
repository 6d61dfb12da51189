//! PostgreSQL implementation of BookingRepository
//!
//! The no-overlap invariant is enforced twice: `insert_if_available` locks the
//! listing row and re-checks overlap inside one transaction, and the
//! `bookings_no_overlap` exclusion constraint rejects anything that slips past.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use stay_core::entities::{Booking, RefundStatus};
use stay_core::error::DomainError;
use stay_core::traits::{BookingRepository, RepoResult};
use stay_core::value_objects::{Snowflake, StayRange};

use crate::mappers::bookings_from_models;
use crate::models::BookingModel;

use super::error::{map_db_error, map_exclusion_violation};

/// PostgreSQL implementation of BookingRepository
#[derive(Clone)]
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new PgBookingRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Booking>> {
        let result = sqlx::query_as::<_, BookingModel>(
            r"
            SELECT id, listing_id, guest_id, check_in, check_out, guests, total_price,
                   payment_intent_id, status::TEXT AS status, is_cancelled, booked_at,
                   cancelled_at, cancellation_reason, refund_status::TEXT AS refund_status,
                   refund_id
            FROM bookings
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Booking::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn has_overlap(&self, listing_id: Snowflake, stay: &StayRange) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE listing_id = $1
                  AND status IN ('booked', 'completed')
                  AND check_in < $3
                  AND check_out > $2
            )
            ",
        )
        .bind(listing_id.into_inner())
        .bind(stay.check_in())
        .bind(stay.check_out())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn overlapping_listing_ids(&self, stay: &StayRange) -> RepoResult<Vec<Snowflake>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT DISTINCT listing_id FROM bookings
            WHERE status IN ('booked', 'completed')
              AND check_in < $2
              AND check_out > $1
            ",
        )
        .bind(stay.check_in())
        .bind(stay.check_out())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(Snowflake::new).collect())
    }

    #[instrument(skip(self, booking), fields(booking_id = %booking.id, listing_id = %booking.listing_id))]
    async fn insert_if_available(&self, booking: &Booking) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Serialises concurrent inserts for the same listing
        let listing = sqlx::query_scalar::<_, i64>("SELECT id FROM listings WHERE id = $1 FOR UPDATE")
            .bind(booking.listing_id.into_inner())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_error)?;
        if listing.is_none() {
            return Err(DomainError::ListingNotFound(booking.listing_id));
        }

        let overlap = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE listing_id = $1
                  AND status IN ('booked', 'completed')
                  AND check_in < $3
                  AND check_out > $2
            )
            ",
        )
        .bind(booking.listing_id.into_inner())
        .bind(booking.stay.check_in())
        .bind(booking.stay.check_out())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;
        if overlap {
            debug!("Overlap found under listing lock");
            return Err(DomainError::BookingConflict {
                listing_id: booking.listing_id,
            });
        }

        sqlx::query(
            r"
            INSERT INTO bookings (id, listing_id, guest_id, check_in, check_out, guests,
                                  total_price, payment_intent_id, status, is_cancelled,
                                  booked_at, refund_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::booking_status, $10, $11,
                    $12::refund_status)
            ",
        )
        .bind(booking.id.into_inner())
        .bind(booking.listing_id.into_inner())
        .bind(booking.guest_id.into_inner())
        .bind(booking.stay.check_in())
        .bind(booking.stay.check_out())
        .bind(booking.guests)
        .bind(booking.total_price)
        .bind(&booking.payment_intent_id)
        .bind(booking.status.as_str())
        .bind(booking.is_cancelled())
        .bind(booking.booked_at)
        .bind(booking.refund_status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_exclusion_violation(e, || DomainError::BookingConflict {
                listing_id: booking.listing_id,
            })
        })?;

        tx.commit().await.map_err(|e| {
            map_exclusion_violation(e, || DomainError::BookingConflict {
                listing_id: booking.listing_id,
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self, booking), fields(booking_id = %booking.id))]
    async fn save_cancellation(&self, booking: &Booking) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE bookings
            SET status = 'cancelled', is_cancelled = TRUE, cancelled_at = $2,
                cancellation_reason = $3, refund_status = $4::refund_status
            WHERE id = $1 AND status = 'booked'
            ",
        )
        .bind(booking.id.into_inner())
        .bind(booking.cancelled_at.unwrap_or_else(Utc::now))
        .bind(booking.cancellation_reason.as_deref())
        .bind(booking.refund_status.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn update_refund(
        &self,
        id: Snowflake,
        status: RefundStatus,
        refund_id: Option<&str>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE bookings
            SET refund_status = $2::refund_status, refund_id = COALESCE($3, refund_id)
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(status.as_str())
        .bind(refund_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::BookingNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn complete_past_due(&self, as_of: NaiveDate) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE bookings
            SET status = 'completed'
            WHERE status = 'booked' AND check_out < $1
            ",
        )
        .bind(as_of)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn find_by_guest(&self, guest_id: Snowflake) -> RepoResult<Vec<Booking>> {
        let results = sqlx::query_as::<_, BookingModel>(
            r"
            SELECT id, listing_id, guest_id, check_in, check_out, guests, total_price,
                   payment_intent_id, status::TEXT AS status, is_cancelled, booked_at,
                   cancelled_at, cancellation_reason, refund_status::TEXT AS refund_status,
                   refund_id
            FROM bookings
            WHERE guest_id = $1
            ORDER BY booked_at DESC, id DESC
            ",
        )
        .bind(guest_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        bookings_from_models(results)
    }

    #[instrument(skip(self))]
    async fn find_by_listing(&self, listing_id: Snowflake) -> RepoResult<Vec<Booking>> {
        let results = sqlx::query_as::<_, BookingModel>(
            r"
            SELECT id, listing_id, guest_id, check_in, check_out, guests, total_price,
                   payment_intent_id, status::TEXT AS status, is_cancelled, booked_at,
                   cancelled_at, cancellation_reason, refund_status::TEXT AS refund_status,
                   refund_id
            FROM bookings
            WHERE listing_id = $1
            ORDER BY check_in, id
            ",
        )
        .bind(listing_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        bookings_from_models(results)
    }

    #[instrument(skip(self))]
    async fn has_stay(&self, guest_id: Snowflake, listing_id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE guest_id = $1 AND listing_id = $2
                  AND status IN ('booked', 'completed')
            )
            ",
        )
        .bind(guest_id.into_inner())
        .bind(listing_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
