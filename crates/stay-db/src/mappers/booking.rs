//! Booking entity <-> model mapper

use stay_core::entities::{Booking, BookingStatus, RefundStatus};
use stay_core::error::DomainError;
use stay_core::value_objects::{Snowflake, StayRange};

use crate::models::BookingModel;

/// Convert BookingModel to Booking entity
///
/// Fails only on rows the schema's constraints should have rejected.
impl TryFrom<BookingModel> for Booking {
    type Error = DomainError;

    fn try_from(model: BookingModel) -> Result<Self, Self::Error> {
        let status: BookingStatus = model.status.parse()?;
        let refund_status: RefundStatus = model.refund_status.parse()?;
        let stay = StayRange::new(model.check_in, model.check_out).map_err(|_| {
            DomainError::DatabaseError(format!("booking {} has an empty stay", model.id))
        })?;

        Ok(Booking {
            id: Snowflake::new(model.id),
            listing_id: Snowflake::new(model.listing_id),
            guest_id: Snowflake::new(model.guest_id),
            stay,
            guests: model.guests,
            total_price: model.total_price,
            payment_intent_id: model.payment_intent_id,
            status,
            booked_at: model.booked_at,
            cancelled_at: model.cancelled_at,
            cancellation_reason: model.cancellation_reason,
            refund_status,
            refund_id: model.refund_id,
        })
    }
}

/// Convert a batch of rows, failing on the first malformed one
pub fn bookings_from_models(models: Vec<BookingModel>) -> Result<Vec<Booking>, DomainError> {
    models.into_iter().map(Booking::try_from).collect()
}
