//! Booking lifecycle service
//!
//! Reservations move Booked → Completed (the sweep) or Booked → Cancelled
//! (guest or admin, followed by a provider refund). Both are terminal.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use stay_core::entities::{Actor, Booking, Listing, RefundStatus};
use stay_core::{DomainError, DomainEvent, Snowflake, StayRange};
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::dto::{
    BookingResponse, CancelBookingRequest, CreateBookingRequest, CreatePaymentIntentRequest,
    PaymentIntentResponse,
};

use super::availability::AvailabilityService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Booking service
pub struct BookingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BookingService<'a> {
    /// Create a new BookingService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a payment intent for the checkout amount
    #[instrument(skip(self))]
    pub async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> ServiceResult<PaymentIntentResponse> {
        let intent = self.ctx.payments().create_intent(request.amount).await?;
        Ok(intent.into())
    }

    /// Reserve a listing for a guest after payment confirmation
    #[instrument(skip(self, request), fields(listing_id = %request.listing_id))]
    pub async fn create_booking(
        &self,
        guest_id: Snowflake,
        request: CreateBookingRequest,
    ) -> ServiceResult<BookingResponse> {
        request.validate()?;
        let stay = StayRange::new(request.check_in, request.check_out)?;
        if request.total_price <= Decimal::ZERO {
            return Err(ServiceError::validation("total_price must be positive"));
        }
        if request.payment_intent_id.trim().is_empty() {
            return Err(ServiceError::validation("payment_intent_id is required"));
        }

        let listing = self.load_listing(request.listing_id).await?;
        if !listing.can_host(request.guests) {
            return Err(DomainError::GuestCapacityExceeded {
                requested: request.guests,
                max: listing.capacity.max_guests,
            }
            .into());
        }

        if !AvailabilityService::new(self.ctx)
            .is_available_for(listing.id, &stay)
            .await?
        {
            return Err(DomainError::BookingConflict {
                listing_id: listing.id,
            }
            .into());
        }

        let booking = Booking::new(
            self.ctx.generate_id(),
            listing.id,
            guest_id,
            stay,
            request.guests,
            request.total_price,
            request.payment_intent_id,
        );
        // Authoritative check: re-run under the listing lock at insert time
        self.ctx.booking_repo().insert_if_available(&booking).await?;

        info!(
            booking_id = %booking.id,
            guest_id = %guest_id,
            check_in = %booking.stay.check_in(),
            check_out = %booking.stay.check_out(),
            "Booking created"
        );

        let event = DomainEvent::booking_created(&booking);
        self.ctx.publish(guest_id, &event);
        if listing.owner_id != guest_id {
            self.ctx.publish(listing.owner_id, &event);
        }
        self.ctx
            .notify(
                guest_id,
                "Booking confirmed",
                &format!(
                    "{} is booked from {} to {}",
                    listing.title,
                    booking.stay.check_in(),
                    booking.stay.check_out()
                ),
            )
            .await;

        Ok(BookingResponse::from(booking))
    }

    /// Cancel a Booked reservation and refund its total
    ///
    /// The cancellation is persisted before the refund is attempted. A failed
    /// refund leaves the booking Cancelled with refund status Failed and
    /// returns `ServiceError::RefundFailed`.
    #[instrument(skip(self, request), fields(actor_id = %actor.id))]
    pub async fn cancel_booking(
        &self,
        actor: &Actor,
        booking_id: Snowflake,
        request: CancelBookingRequest,
    ) -> ServiceResult<BookingResponse> {
        request.validate()?;

        let mut booking = self.load_booking(booking_id).await?;
        if !actor.acts_for(booking.guest_id) {
            return Err(ServiceError::permission_denied("cancel this booking"));
        }

        booking.cancel(request.reason, Utc::now())?;
        if !self.ctx.booking_repo().save_cancellation(&booking).await? {
            // Lost a race, typically with the completion sweep
            let current = self.load_booking(booking_id).await?;
            return Err(DomainError::InvalidBookingState {
                booking_id,
                status: current.status,
                action: "cancelled",
            }
            .into());
        }
        info!(%booking_id, "Booking cancelled, refund pending");

        let refund = self
            .ctx
            .payments()
            .refund(&booking.payment_intent_id, booking.total_price)
            .await;

        let outcome = match refund {
            Ok(receipt) => {
                self.record_refund_outcome(booking_id, RefundStatus::Completed, Some(&receipt.id))
                    .await;
                booking.record_refund(RefundStatus::Completed, Some(receipt.id));
                Ok(())
            }
            Err(e) => {
                error!(%booking_id, error = %e, "Refund failed, booking left cancelled");
                self.record_refund_outcome(booking_id, RefundStatus::Failed, None)
                    .await;
                booking.record_refund(RefundStatus::Failed, None);
                Err(ServiceError::RefundFailed {
                    booking_id,
                    message: e.to_string(),
                })
            }
        };

        self.announce_cancellation(&booking).await;
        outcome.map(|()| BookingResponse::from(booking))
    }

    /// Persist the refund result. The provider outcome stays authoritative,
    /// so a failed write is logged for reconciliation instead of returned.
    async fn record_refund_outcome(
        &self,
        booking_id: Snowflake,
        status: RefundStatus,
        refund_id: Option<&str>,
    ) {
        if let Err(e) = self
            .ctx
            .booking_repo()
            .update_refund(booking_id, status, refund_id)
            .await
        {
            error!(
                %booking_id,
                refund_status = ?status,
                refund_id = ?refund_id,
                error = %e,
                "Failed to record refund outcome"
            );
        }
    }

    /// Complete every Booked reservation whose checkout is before `as_of`
    #[instrument(skip(self))]
    pub async fn complete_past_due(&self, as_of: NaiveDate) -> ServiceResult<u64> {
        let completed = self.ctx.booking_repo().complete_past_due(as_of).await?;
        if completed > 0 {
            info!(completed, %as_of, "Completed past-due bookings");
        }
        Ok(completed)
    }

    /// A booking visible to its guest, the listing's host, or an admin
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn get_booking(
        &self,
        actor: &Actor,
        booking_id: Snowflake,
    ) -> ServiceResult<BookingResponse> {
        let booking = self.load_booking(booking_id).await?;
        if !actor.acts_for(booking.guest_id) {
            let listing = self.load_listing(booking.listing_id).await?;
            if !listing.is_owned_by(actor.id) {
                return Err(ServiceError::permission_denied("view this booking"));
            }
        }
        Ok(BookingResponse::from(booking))
    }

    /// A guest's bookings, newest first
    #[instrument(skip(self))]
    pub async fn bookings_for_guest(&self, guest_id: Snowflake) -> ServiceResult<Vec<BookingResponse>> {
        let bookings = self.ctx.booking_repo().find_by_guest(guest_id).await?;
        Ok(bookings.into_iter().map(BookingResponse::from).collect())
    }

    /// Reservations occupying a listing's calendar, by check-in
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn listing_schedule(
        &self,
        actor: &Actor,
        listing_id: Snowflake,
    ) -> ServiceResult<Vec<BookingResponse>> {
        let listing = self.load_listing(listing_id).await?;
        if !actor.acts_for(listing.owner_id) {
            return Err(ServiceError::permission_denied("view this listing's schedule"));
        }

        let bookings = self.ctx.booking_repo().find_by_listing(listing_id).await?;
        Ok(bookings
            .into_iter()
            .filter(Booking::blocks_calendar)
            .map(BookingResponse::from)
            .collect())
    }

    async fn announce_cancellation(&self, booking: &Booking) {
        let event = DomainEvent::booking_cancelled(booking);
        self.ctx.publish(booking.guest_id, &event);
        match self.ctx.listing_repo().find_by_id(booking.listing_id).await {
            Ok(Some(listing)) if listing.owner_id != booking.guest_id => {
                self.ctx.publish(listing.owner_id, &event);
            }
            Ok(_) => {}
            Err(e) => warn!(booking_id = %booking.id, error = %e, "Host lookup failed"),
        }

        let body = match booking.refund_status {
            RefundStatus::Completed => "Your booking was cancelled and the refund is on its way",
            _ => "Your booking was cancelled; the refund is being reviewed",
        };
        self.ctx.notify(booking.guest_id, "Booking cancelled", body).await;
    }

    async fn load_listing(&self, listing_id: Snowflake) -> ServiceResult<Listing> {
        self.ctx
            .listing_repo()
            .find_by_id(listing_id)
            .await?
            .ok_or_else(|| DomainError::ListingNotFound(listing_id).into())
    }

    async fn load_booking(&self, booking_id: Snowflake) -> ServiceResult<Booking> {
        self.ctx
            .booking_repo()
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| DomainError::BookingNotFound(booking_id).into())
    }
}
