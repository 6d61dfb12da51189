//! Booking lifecycle scenarios: availability, cancellation with refund, and
//! the completion sweep.
//!
//! Run with: cargo test -p integration-tests --test booking_flow

use futures::future::join_all;
use integration_tests::{booking_request, date, new_user, LiveStack};
use rust_decimal::Decimal;
use stay_core::entities::{BookingStatus, RefundStatus};
use stay_core::PaymentError;
use stay_service::dto::{CancelBookingRequest, CreateBookingRequest};
use stay_service::{AvailabilityService, BookingService, ServiceError, SweepService};

fn cancel_request() -> CancelBookingRequest {
    CancelBookingRequest {
        reason: "Plans changed".to_string(),
    }
}

// ============================================================================
// Availability
// ============================================================================

#[tokio::test]
async fn test_overlapping_booking_rejected_and_back_to_back_allowed() {
    let stack = LiveStack::start();
    let (_, listing) = stack.approved_listing("Kumarakom", 100).await;
    let bookings = BookingService::new(stack.ctx());
    let availability = AvailabilityService::new(stack.ctx());

    let first = bookings
        .create_booking(
            new_user().id,
            CreateBookingRequest {
                total_price: Decimal::new(200, 0),
                payment_intent_id: "pi_123".to_string(),
                ..booking_request(listing.id, date(2024, 6, 1), date(2024, 6, 3))
            },
        )
        .await
        .unwrap();
    assert_eq!(first.nights, 2);
    assert_eq!(first.status, BookingStatus::Booked);

    assert!(!availability
        .is_available(listing.id, date(2024, 6, 2), date(2024, 6, 4))
        .await
        .unwrap());
    let err = bookings
        .create_booking(
            new_user().id,
            booking_request(listing.id, date(2024, 6, 2), date(2024, 6, 4)),
        )
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    assert!(availability
        .is_available(listing.id, date(2024, 6, 3), date(2024, 6, 5))
        .await
        .unwrap());
    let third = bookings
        .create_booking(
            new_user().id,
            booking_request(listing.id, date(2024, 6, 3), date(2024, 6, 5)),
        )
        .await
        .unwrap();
    assert_eq!(third.status, BookingStatus::Booked);
}

#[tokio::test]
async fn test_concurrent_bookings_admit_exactly_one() {
    let stack = LiveStack::start();
    let (_, listing) = stack.approved_listing("Munnar", 100).await;
    let bookings = BookingService::new(stack.ctx());

    let attempts = (0..8).map(|_| {
        bookings.create_booking(
            new_user().id,
            booking_request(listing.id, date(2025, 1, 10), date(2025, 1, 14)),
        )
    });
    let results = join_all(attempts).await;

    let admitted = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.is_conflict()))
        .count();
    assert_eq!(admitted, 1);
    assert_eq!(conflicts, 7);
}

#[tokio::test]
async fn test_cancelled_booking_frees_dates() {
    let stack = LiveStack::start();
    let (_, listing) = stack.approved_listing("Varkala", 100).await;
    let bookings = BookingService::new(stack.ctx());
    let guest = new_user();

    let booked = bookings
        .create_booking(
            guest.id,
            booking_request(listing.id, date(2025, 2, 1), date(2025, 2, 4)),
        )
        .await
        .unwrap();
    bookings
        .cancel_booking(&guest, booked.id, cancel_request())
        .await
        .unwrap();

    assert!(AvailabilityService::new(stack.ctx())
        .is_available(listing.id, date(2025, 2, 1), date(2025, 2, 4))
        .await
        .unwrap());
}

// ============================================================================
// Cancellation and refunds
// ============================================================================

#[tokio::test]
async fn test_cancel_refunds_full_total() {
    let stack = LiveStack::start();
    let (_, listing) = stack.approved_listing("Kochi", 100).await;
    let bookings = BookingService::new(stack.ctx());
    let guest = new_user();

    let booked = bookings
        .create_booking(
            guest.id,
            CreateBookingRequest {
                total_price: Decimal::new(200, 0),
                payment_intent_id: "pi_123".to_string(),
                ..booking_request(listing.id, date(2024, 6, 1), date(2024, 6, 3))
            },
        )
        .await
        .unwrap();

    let cancelled = bookings
        .cancel_booking(&guest, booked.id, cancel_request())
        .await
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert!(cancelled.is_cancelled);
    assert_eq!(cancelled.refund_status, RefundStatus::Completed);
    assert_eq!(
        stack.harness.payments.refund_calls(),
        vec![("pi_123".to_string(), 20_000)]
    );

    let err = bookings
        .cancel_booking(&guest, booked.id, cancel_request())
        .await
        .unwrap_err();
    assert!(err.is_invalid_state());
    assert_eq!(stack.harness.payments.refund_calls().len(), 1);
    assert!(stack.harness.booking(booked.id).await.is_cancelled());
}

#[tokio::test]
async fn test_refund_retried_through_transient_failures() {
    let stack = LiveStack::start();
    let (_, listing) = stack.approved_listing("Thekkady", 100).await;
    let bookings = BookingService::new(stack.ctx());
    let guest = new_user();
    let booked = bookings
        .create_booking(
            guest.id,
            booking_request(listing.id, date(2025, 3, 1), date(2025, 3, 3)),
        )
        .await
        .unwrap();

    let payments = &stack.harness.payments;
    payments.push_refund_result(Err(PaymentError::Transient("503".to_string())));
    payments.push_refund_result(Err(PaymentError::Transient("timeout".to_string())));

    let cancelled = bookings
        .cancel_booking(&guest, booked.id, cancel_request())
        .await
        .unwrap();
    assert_eq!(cancelled.refund_status, RefundStatus::Completed);
    assert_eq!(payments.refund_calls().len(), 3);

    let stored = stack.harness.booking(booked.id).await;
    assert_eq!(stored.refund_status, RefundStatus::Completed);
    assert!(stored.refund_id.is_some());
}

#[tokio::test]
async fn test_rejected_refund_leaves_booking_cancelled() {
    let stack = LiveStack::start();
    let (_, listing) = stack.approved_listing("Wayanad", 100).await;
    let bookings = BookingService::new(stack.ctx());
    let guest = new_user();
    let booked = bookings
        .create_booking(
            guest.id,
            booking_request(listing.id, date(2025, 4, 1), date(2025, 4, 3)),
        )
        .await
        .unwrap();

    let payments = &stack.harness.payments;
    payments.push_refund_result(Err(PaymentError::Rejected(
        "charge_already_refunded".to_string(),
    )));

    let err = bookings
        .cancel_booking(&guest, booked.id, cancel_request())
        .await
        .unwrap_err();
    assert!(err.is_payment_provider());
    assert!(matches!(err, ServiceError::RefundFailed { booking_id, .. } if booking_id == booked.id));
    assert_eq!(err.error_code(), "PAYMENT_PROVIDER_ERROR");
    assert_eq!(payments.refund_calls().len(), 1);

    let stored = stack.harness.booking(booked.id).await;
    assert_eq!(stored.status, BookingStatus::Cancelled);
    assert_eq!(stored.refund_status, RefundStatus::Failed);
}

#[tokio::test]
async fn test_other_guest_cannot_cancel() {
    let stack = LiveStack::start();
    let (_, listing) = stack.approved_listing("Kovalam", 100).await;
    let bookings = BookingService::new(stack.ctx());
    let booked = bookings
        .create_booking(
            new_user().id,
            booking_request(listing.id, date(2025, 5, 1), date(2025, 5, 3)),
        )
        .await
        .unwrap();

    let err = bookings
        .cancel_booking(&new_user(), booked.id, cancel_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied { .. }));

    let by_admin = bookings
        .cancel_booking(&stack.admin, booked.id, cancel_request())
        .await
        .unwrap();
    assert!(by_admin.is_cancelled);
}

// ============================================================================
// Completion sweep
// ============================================================================

#[tokio::test]
async fn test_sweep_is_idempotent() {
    let stack = LiveStack::start();
    let (_, listing) = stack.approved_listing("Alleppey", 100).await;
    let past = stack
        .harness
        .seed_booking(listing.id, date(2024, 1, 1), date(2024, 1, 3))
        .await;
    let ends_today = stack
        .harness
        .seed_booking(listing.id, date(2024, 1, 8), date(2024, 1, 10))
        .await;
    let future = stack
        .harness
        .seed_booking(listing.id, date(2024, 2, 1), date(2024, 2, 5))
        .await;

    let sweep = SweepService::new(stack.ctx());
    assert_eq!(sweep.run_as_of(date(2024, 1, 10)).await.unwrap(), 1);
    assert_eq!(sweep.run_as_of(date(2024, 1, 10)).await.unwrap(), 0);

    assert_eq!(stack.harness.booking(past.id).await.status, BookingStatus::Completed);
    assert_eq!(stack.harness.booking(ends_today.id).await.status, BookingStatus::Booked);
    assert_eq!(stack.harness.booking(future.id).await.status, BookingStatus::Booked);
}

#[tokio::test]
async fn test_completed_stay_cannot_be_cancelled() {
    let stack = LiveStack::start();
    let (_, listing) = stack.approved_listing("Fort Kochi", 100).await;
    let booking = stack
        .harness
        .seed_booking(listing.id, date(2024, 3, 1), date(2024, 3, 2))
        .await;
    SweepService::new(stack.ctx())
        .run_as_of(date(2024, 3, 5))
        .await
        .unwrap();

    let err = BookingService::new(stack.ctx())
        .cancel_booking(&stack.admin, booking.id, cancel_request())
        .await
        .unwrap_err();
    assert!(err.is_invalid_state());
    assert!(stack.harness.payments.refund_calls().is_empty());

    // Completed stays still block the calendar
    assert!(!AvailabilityService::new(stack.ctx())
        .is_available(listing.id, date(2024, 3, 1), date(2024, 3, 2))
        .await
        .unwrap());
}
