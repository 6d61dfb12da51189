//! Listing moderation, search visibility and reviews
//!
//! Run with: cargo test -p integration-tests --test listings_reviews

use integration_tests::{booking_request, date, listing_request, new_user, LiveStack};
use stay_service::dto::{AddReviewRequest, CancelBookingRequest, RejectListingRequest, SearchListingsRequest};
use stay_service::{AvailabilityService, BookingService, ListingService, ReviewService, ServiceError};

fn search_in(town: &str) -> SearchListingsRequest {
    SearchListingsRequest {
        location: Some(town.to_string()),
        ..SearchListingsRequest::default()
    }
}

fn review(rating: i16, comment: &str) -> AddReviewRequest {
    AddReviewRequest {
        rating,
        comment: comment.to_string(),
    }
}

// ============================================================================
// Moderation and search
// ============================================================================

#[tokio::test]
async fn test_approval_makes_listing_searchable() {
    let stack = LiveStack::start();
    let listings = ListingService::new(stack.ctx());
    let availability = AvailabilityService::new(stack.ctx());
    let host = new_user();

    let pending = listings
        .create_listing(host.id, listing_request("Marari", 2500))
        .await
        .unwrap();
    assert!(!pending.is_verified);
    assert!(availability.search_listings(search_in("Marari")).await.unwrap().is_empty());

    let err = listings.approve_listing(&host, pending.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied { .. }));

    listings.approve_listing(&stack.admin, pending.id).await.unwrap();
    let found = availability.search_listings(search_in("marari")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, pending.id);

    let notes = stack.harness.notifier.sent_to(host.id);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].0, "Listing approved");
}

#[tokio::test]
async fn test_rejected_listing_stays_hidden() {
    let stack = LiveStack::start();
    let listings = ListingService::new(stack.ctx());
    let host = new_user();

    let pending = listings
        .create_listing(host.id, listing_request("Bekal", 1800))
        .await
        .unwrap();
    let rejected = listings
        .reject_listing(
            &stack.admin,
            pending.id,
            RejectListingRequest {
                reason: "Photos do not match the address".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(!rejected.is_verified);
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("Photos do not match the address")
    );

    let found = AvailabilityService::new(stack.ctx())
        .search_listings(search_in("Bekal"))
        .await
        .unwrap();
    assert!(found.is_empty());

    let own = listings.listings_for_owner(host.id).await.unwrap();
    assert_eq!(own.len(), 1);
    assert!(stack.harness.notifier.sent_to(host.id)[0].1.contains("Photos"));
}

#[tokio::test]
async fn test_search_excludes_listings_booked_for_range() {
    let stack = LiveStack::start();
    let (_, booked) = stack.approved_listing("Poovar", 100).await;
    let (_, free) = stack.approved_listing("Poovar", 120).await;

    BookingService::new(stack.ctx())
        .create_booking(
            new_user().id,
            booking_request(booked.id, date(2025, 6, 10), date(2025, 6, 12)),
        )
        .await
        .unwrap();

    let found = AvailabilityService::new(stack.ctx())
        .search_listings(SearchListingsRequest {
            check_in: Some(date(2025, 6, 11)),
            check_out: Some(date(2025, 6, 13)),
            ..search_in("Poovar")
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, free.id);

    let all = AvailabilityService::new(stack.ctx())
        .search_listings(search_in("Poovar"))
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

// ============================================================================
// Reviews
// ============================================================================

#[tokio::test]
async fn test_review_requires_stay_and_is_unique() {
    let stack = LiveStack::start();
    let (_, listing) = stack.approved_listing("Kollam", 100).await;
    let reviews = ReviewService::new(stack.ctx());
    let guest = new_user();

    assert!(!reviews.can_review(guest.id, listing.id).await.unwrap().can_review);
    let err = reviews
        .add_review(guest.id, listing.id, review(5, "Lovely"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_state());

    BookingService::new(stack.ctx())
        .create_booking(
            guest.id,
            booking_request(listing.id, date(2025, 7, 1), date(2025, 7, 3)),
        )
        .await
        .unwrap();
    assert!(reviews.can_review(guest.id, listing.id).await.unwrap().can_review);

    let added = reviews
        .add_review(guest.id, listing.id, review(4, "Great host"))
        .await
        .unwrap();
    assert_eq!(added.rating, 4);
    assert!(!reviews.can_review(guest.id, listing.id).await.unwrap().can_review);

    let err = reviews
        .add_review(guest.id, listing.id, review(5, "Again"))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_cancelled_stay_does_not_qualify_for_review() {
    let stack = LiveStack::start();
    let (_, listing) = stack.approved_listing("Kasaragod", 100).await;
    let guest = new_user();
    let bookings = BookingService::new(stack.ctx());

    let booked = bookings
        .create_booking(
            guest.id,
            booking_request(listing.id, date(2025, 8, 1), date(2025, 8, 3)),
        )
        .await
        .unwrap();
    bookings
        .cancel_booking(
            &guest,
            booked.id,
            CancelBookingRequest {
                reason: "Flight cancelled".to_string(),
            },
        )
        .await
        .unwrap();

    let reviews = ReviewService::new(stack.ctx());
    assert!(!reviews.can_review(guest.id, listing.id).await.unwrap().can_review);
}

#[tokio::test]
async fn test_reviews_listed_newest_first() {
    let stack = LiveStack::start();
    let (_, listing) = stack.approved_listing("Kannur", 100).await;
    let reviews = ReviewService::new(stack.ctx());
    let bookings = BookingService::new(stack.ctx());

    let mut authors = Vec::new();
    for (n, day) in [1u32, 5, 9].into_iter().enumerate() {
        let guest = new_user();
        bookings
            .create_booking(
                guest.id,
                booking_request(listing.id, date(2025, 9, day), date(2025, 9, day + 2)),
            )
            .await
            .unwrap();
        reviews
            .add_review(guest.id, listing.id, review(3 + n as i16, "Nice"))
            .await
            .unwrap();
        authors.push(guest.id);
    }

    let listed = reviews.list_reviews(listing.id).await.unwrap();
    let order: Vec<_> = listed.iter().map(|r| r.author_id).collect();
    authors.reverse();
    assert_eq!(order, authors);

    let err = reviews
        .add_review(new_user().id, listing.id, review(6, "Too good"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}
