//! In-memory implementation of BookingRepository
//!
//! Every operation runs under one mutex, so check-and-insert is atomic.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};

use stay_core::entities::{Booking, BookingStatus, RefundStatus};
use stay_core::error::DomainError;
use stay_core::traits::{BookingRepository, RepoResult};
use stay_core::value_objects::{Snowflake, StayRange};

#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: Mutex<HashMap<Snowflake, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn overlaps(booking: &Booking, listing_id: Snowflake, stay: &StayRange) -> bool {
    booking.listing_id == listing_id && booking.blocks_calendar() && booking.stay.overlaps(stay)
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Booking>> {
        Ok(self.bookings.lock().get(&id).cloned())
    }

    async fn has_overlap(&self, listing_id: Snowflake, stay: &StayRange) -> RepoResult<bool> {
        Ok(self
            .bookings
            .lock()
            .values()
            .any(|b| overlaps(b, listing_id, stay)))
    }

    async fn overlapping_listing_ids(&self, stay: &StayRange) -> RepoResult<Vec<Snowflake>> {
        let ids: BTreeSet<Snowflake> = self
            .bookings
            .lock()
            .values()
            .filter(|b| b.blocks_calendar() && b.stay.overlaps(stay))
            .map(|b| b.listing_id)
            .collect();
        Ok(ids.into_iter().collect())
    }

    async fn insert_if_available(&self, booking: &Booking) -> RepoResult<()> {
        let mut bookings = self.bookings.lock();
        if bookings
            .values()
            .any(|b| overlaps(b, booking.listing_id, &booking.stay))
        {
            return Err(DomainError::BookingConflict {
                listing_id: booking.listing_id,
            });
        }
        if bookings.contains_key(&booking.id) {
            return Err(DomainError::DatabaseError(format!(
                "duplicate booking id {}",
                booking.id
            )));
        }
        bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn save_cancellation(&self, booking: &Booking) -> RepoResult<bool> {
        let mut bookings = self.bookings.lock();
        let Some(stored) = bookings.get_mut(&booking.id) else {
            return Err(DomainError::BookingNotFound(booking.id));
        };
        if stored.status != BookingStatus::Booked {
            return Ok(false);
        }
        stored.status = BookingStatus::Cancelled;
        stored.cancelled_at = Some(booking.cancelled_at.unwrap_or_else(Utc::now));
        stored.cancellation_reason.clone_from(&booking.cancellation_reason);
        stored.refund_status = booking.refund_status;
        Ok(true)
    }

    async fn update_refund(
        &self,
        id: Snowflake,
        status: RefundStatus,
        refund_id: Option<&str>,
    ) -> RepoResult<()> {
        let mut bookings = self.bookings.lock();
        let stored = bookings
            .get_mut(&id)
            .ok_or(DomainError::BookingNotFound(id))?;
        stored.record_refund(status, refund_id.map(str::to_string));
        Ok(())
    }

    async fn complete_past_due(&self, as_of: NaiveDate) -> RepoResult<u64> {
        let mut changed = 0;
        for booking in self.bookings.lock().values_mut() {
            if booking.status == BookingStatus::Booked && booking.stay.ended_before(as_of) {
                booking.status = BookingStatus::Completed;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn find_by_guest(&self, guest_id: Snowflake) -> RepoResult<Vec<Booking>> {
        let mut found: Vec<Booking> = self
            .bookings
            .lock()
            .values()
            .filter(|b| b.guest_id == guest_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.booked_at.cmp(&a.booked_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn find_by_listing(&self, listing_id: Snowflake) -> RepoResult<Vec<Booking>> {
        let mut found: Vec<Booking> = self
            .bookings
            .lock()
            .values()
            .filter(|b| b.listing_id == listing_id)
            .cloned()
            .collect();
        found.sort_by_key(|b| (b.stay.check_in(), b.id));
        Ok(found)
    }

    async fn has_stay(&self, guest_id: Snowflake, listing_id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .bookings
            .lock()
            .values()
            .any(|b| b.guest_id == guest_id && b.listing_id == listing_id && b.blocks_calendar()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn booking(id: i64, listing: i64, from: u32, to: u32) -> Booking {
        Booking::new(
            Snowflake::new(id),
            Snowflake::new(listing),
            Snowflake::new(500),
            StayRange::new(d(from), d(to)).unwrap(),
            1,
            Decimal::from(100),
            format!("pi_{id}"),
        )
    }

    #[tokio::test]
    async fn test_insert_rejects_overlap_but_allows_back_to_back() {
        let repo = InMemoryBookingRepository::new();
        repo.insert_if_available(&booking(1, 10, 1, 3)).await.unwrap();

        let err = repo.insert_if_available(&booking(2, 10, 2, 4)).await.unwrap_err();
        assert!(err.is_conflict());

        repo.insert_if_available(&booking(3, 10, 3, 5)).await.unwrap();
        repo.insert_if_available(&booking(4, 11, 1, 3)).await.unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_booking_frees_calendar() {
        let repo = InMemoryBookingRepository::new();
        let mut first = booking(1, 10, 1, 3);
        repo.insert_if_available(&first).await.unwrap();

        first.cancel("x".to_string(), Utc::now()).unwrap();
        assert!(repo.save_cancellation(&first).await.unwrap());
        assert!(!repo.has_overlap(Snowflake::new(10), &first.stay).await.unwrap());

        repo.insert_if_available(&booking(2, 10, 1, 3)).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_cancellation_after_completion_is_refused() {
        let repo = InMemoryBookingRepository::new();
        let mut b = booking(1, 10, 1, 3);
        repo.insert_if_available(&b).await.unwrap();
        assert_eq!(repo.complete_past_due(d(10)).await.unwrap(), 1);

        b.cancel("late".to_string(), Utc::now()).unwrap();
        assert!(!repo.save_cancellation(&b).await.unwrap());

        let stored = repo.find_by_id(b.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn test_complete_past_due_is_idempotent() {
        let repo = InMemoryBookingRepository::new();
        repo.insert_if_available(&booking(1, 10, 1, 3)).await.unwrap();
        repo.insert_if_available(&booking(2, 10, 5, 9)).await.unwrap();

        assert_eq!(repo.complete_past_due(d(4)).await.unwrap(), 1);
        assert_eq!(repo.complete_past_due(d(4)).await.unwrap(), 0);
        // check_out == as_of is not yet past due
        assert_eq!(repo.complete_past_due(d(9)).await.unwrap(), 0);
        assert_eq!(repo.complete_past_due(d(10)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_admit_exactly_one() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.insert_if_available(&booking(100 + i, 10, 1, 4)).await })
            })
            .collect();

        let results = futures::future::join_all(handles).await;
        let ok = results.iter().filter(|r| matches!(r, Ok(Ok(())))).count();
        assert_eq!(ok, 1);
    }
}
