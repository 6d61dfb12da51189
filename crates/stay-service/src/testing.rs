//! Test doubles and an in-memory service harness
//!
//! Compiled for this crate's tests and, through the `testing` feature, for
//! the workspace integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use stay_core::entities::{Booking, Capacity, Listing, Location, RefundStatus};
use stay_core::traits::{BookingRepository, ListingRepository, RepoResult};
use stay_core::{
    DomainError, DomainEvent, EventSink, MediaStorage, Notifier, PaymentError, PaymentGateway,
    PaymentIntent, RefundReceipt, Snowflake, SnowflakeGenerator, StayRange,
};
use stay_db::{
    InMemoryBookingRepository, InMemoryConversationRepository, InMemoryListingRepository,
    InMemoryReviewRepository,
};

use crate::dto::CreateBookingRequest;
use crate::payment::{PaymentCoordinator, RetryPolicy};
use crate::services::{ServiceContext, ServiceContextBuilder};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Two guests, intent `pi_test`, total 3001.00
pub fn booking_request(
    listing_id: Snowflake,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> CreateBookingRequest {
    CreateBookingRequest {
        listing_id,
        check_in,
        check_out,
        guests: 2,
        total_price: Decimal::new(300_100, 2),
        payment_intent_id: "pi_test".to_string(),
    }
}

// ============================================================================
// Payment gateway
// ============================================================================

/// Gateway that succeeds unless a failure has been scripted
#[derive(Default)]
pub struct MockPaymentGateway {
    intent_script: Mutex<VecDeque<Result<(), PaymentError>>>,
    refund_script: Mutex<VecDeque<Result<(), PaymentError>>>,
    intent_calls: Mutex<Vec<i64>>,
    refund_calls: Mutex<Vec<(String, i64)>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome of the next unscripted `create_intent` call
    pub fn push_intent_result(&self, result: Result<(), PaymentError>) {
        self.intent_script.lock().push_back(result);
    }

    /// Outcome of the next unscripted `refund` call
    pub fn push_refund_result(&self, result: Result<(), PaymentError>) {
        self.refund_script.lock().push_back(result);
    }

    pub fn intent_calls(&self) -> Vec<i64> {
        self.intent_calls.lock().clone()
    }

    pub fn refund_calls(&self) -> Vec<(String, i64)> {
        self.refund_calls.lock().clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let n = {
            let mut calls = self.intent_calls.lock();
            calls.push(amount_minor);
            calls.len()
        };
        self.intent_script.lock().pop_front().unwrap_or(Ok(()))?;
        Ok(PaymentIntent {
            id: format!("pi_mock_{n}"),
            client_secret: Some(format!("pi_mock_{n}_secret")),
            amount_minor,
            currency: currency.to_string(),
        })
    }

    async fn refund(&self, intent_id: &str, amount_minor: i64) -> Result<RefundReceipt, PaymentError> {
        let n = {
            let mut calls = self.refund_calls.lock();
            calls.push((intent_id.to_string(), amount_minor));
            calls.len()
        };
        self.refund_script.lock().pop_front().unwrap_or(Ok(()))?;
        Ok(RefundReceipt {
            id: format!("re_mock_{n}"),
            amount_minor,
            status: "succeeded".to_string(),
        })
    }
}

// ============================================================================
// Event sink
// ============================================================================

/// Records every delivery; optionally forwards to a real sink
pub struct RecordingEventSink {
    delivered: Mutex<Vec<(Snowflake, DomainEvent)>>,
    live_connections: AtomicUsize,
    forward: Option<Arc<dyn EventSink>>,
}

impl Default for RecordingEventSink {
    fn default() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            live_connections: AtomicUsize::new(1),
            forward: None,
        }
    }
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record, then hand each event to `inner` and report its count
    pub fn forwarding(inner: Arc<dyn EventSink>) -> Self {
        Self {
            forward: Some(inner),
            ..Self::default()
        }
    }

    /// Connections each delivery reports reaching when not forwarding
    pub fn set_live_connections(&self, n: usize) {
        self.live_connections.store(n, Ordering::SeqCst);
    }

    pub fn events_for(&self, user_id: Snowflake) -> Vec<DomainEvent> {
        self.delivered
            .lock()
            .iter()
            .filter(|(to, _)| *to == user_id)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.delivered.lock().len()
    }
}

impl EventSink for RecordingEventSink {
    fn deliver(&self, user_id: Snowflake, event: &DomainEvent) -> usize {
        self.delivered.lock().push((user_id, event.clone()));
        match &self.forward {
            Some(inner) => inner.deliver(user_id, event),
            None => self.live_connections.load(Ordering::SeqCst),
        }
    }
}

// ============================================================================
// Booking repository
// ============================================================================

/// Delegates to an in-memory repository, optionally failing refund writes
pub struct FaultyBookingRepository {
    inner: Arc<InMemoryBookingRepository>,
    fail_refund_updates: AtomicBool,
}

impl FaultyBookingRepository {
    pub fn new(inner: Arc<InMemoryBookingRepository>) -> Self {
        Self {
            inner,
            fail_refund_updates: AtomicBool::new(false),
        }
    }

    /// Make every later `update_refund` return a database error
    pub fn set_failing_refund_updates(&self, failing: bool) {
        self.fail_refund_updates.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookingRepository for FaultyBookingRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Booking>> {
        self.inner.find_by_id(id).await
    }

    async fn has_overlap(&self, listing_id: Snowflake, stay: &StayRange) -> RepoResult<bool> {
        self.inner.has_overlap(listing_id, stay).await
    }

    async fn overlapping_listing_ids(&self, stay: &StayRange) -> RepoResult<Vec<Snowflake>> {
        self.inner.overlapping_listing_ids(stay).await
    }

    async fn insert_if_available(&self, booking: &Booking) -> RepoResult<()> {
        self.inner.insert_if_available(booking).await
    }

    async fn save_cancellation(&self, booking: &Booking) -> RepoResult<bool> {
        self.inner.save_cancellation(booking).await
    }

    async fn update_refund(
        &self,
        id: Snowflake,
        status: RefundStatus,
        refund_id: Option<&str>,
    ) -> RepoResult<()> {
        if self.fail_refund_updates.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("connection reset".to_string()));
        }
        self.inner.update_refund(id, status, refund_id).await
    }

    async fn complete_past_due(&self, as_of: NaiveDate) -> RepoResult<u64> {
        self.inner.complete_past_due(as_of).await
    }

    async fn find_by_guest(&self, guest_id: Snowflake) -> RepoResult<Vec<Booking>> {
        self.inner.find_by_guest(guest_id).await
    }

    async fn find_by_listing(&self, listing_id: Snowflake) -> RepoResult<Vec<Booking>> {
        self.inner.find_by_listing(listing_id).await
    }

    async fn has_stay(&self, guest_id: Snowflake, listing_id: Snowflake) -> RepoResult<bool> {
        self.inner.has_stay(guest_id, listing_id).await
    }
}

// ============================================================================
// Notifier
// ============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(Snowflake, String, String)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later send return an error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// (subject, body) pairs sent to `user_id`
    pub fn sent_to(&self, user_id: Snowflake) -> Vec<(String, String)> {
        self.sent
            .lock()
            .iter()
            .filter(|(to, _, _)| *to == user_id)
            .map(|(_, s, b)| (s.clone(), b.clone()))
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: Snowflake, subject: &str, body: &str) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::InternalError("mail relay down".to_string()));
        }
        self.sent
            .lock()
            .push((to, subject.to_string(), body.to_string()));
        Ok(())
    }
}

// ============================================================================
// Media storage
// ============================================================================

#[derive(Default)]
pub struct InMemoryMediaStorage {
    uploads: AtomicUsize,
}

impl InMemoryMediaStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaStorage for InMemoryMediaStorage {
    async fn upload(&self, _bytes: &[u8], _content_type: &str) -> Result<String, DomainError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("memory://{}", uuid::Uuid::new_v4()))
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A `ServiceContext` over in-memory repositories and recording collaborators
pub struct TestHarness {
    pub ctx: ServiceContext,
    pub listings: Arc<InMemoryListingRepository>,
    pub bookings: Arc<InMemoryBookingRepository>,
    /// The booking repository the services see; wraps `bookings`
    pub booking_store: Arc<FaultyBookingRepository>,
    pub payments: Arc<MockPaymentGateway>,
    pub events: Arc<RecordingEventSink>,
    pub notifier: Arc<RecordingNotifier>,
    pub media: Arc<InMemoryMediaStorage>,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_events(Arc::new(RecordingEventSink::new()))
    }

    pub fn with_events(events: Arc<RecordingEventSink>) -> Self {
        let listings = Arc::new(InMemoryListingRepository::new());
        let bookings = Arc::new(InMemoryBookingRepository::new());
        let booking_store = Arc::new(FaultyBookingRepository::new(bookings.clone()));
        let payments = Arc::new(MockPaymentGateway::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let media = Arc::new(InMemoryMediaStorage::new());

        let coordinator = PaymentCoordinator::new(
            payments.clone(),
            "inr",
            2,
            RetryPolicy::immediate(3),
        );
        let ctx = ServiceContextBuilder::new()
            .listing_repo(listings.clone())
            .booking_repo(booking_store.clone())
            .conversation_repo(Arc::new(InMemoryConversationRepository::new()))
            .review_repo(Arc::new(InMemoryReviewRepository::new()))
            .payments(Arc::new(coordinator))
            .media_storage(media.clone())
            .notifier(notifier.clone())
            .events(events.clone())
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
            .build()
            .unwrap();

        Self {
            ctx,
            listings,
            bookings,
            booking_store,
            payments,
            events,
            notifier,
            media,
        }
    }

    /// A verified listing in `town` owned by a fresh host
    pub async fn seed_listing(&self, town: &str, max_guests: i32) -> Listing {
        let mut listing = self.listing(town, max_guests);
        listing.approve();
        self.listings.create(&listing).await.unwrap();
        listing
    }

    /// A listing still awaiting moderation
    pub async fn seed_pending_listing(&self, town: &str) -> Listing {
        let listing = self.listing(town, 2);
        self.listings.create(&listing).await.unwrap();
        listing
    }

    /// A Booked reservation by a fresh guest, written straight to the repository
    pub async fn seed_booking(
        &self,
        listing_id: Snowflake,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Booking {
        let booking = Booking::new(
            self.ctx.generate_id(),
            listing_id,
            self.ctx.generate_id(),
            StayRange::new(check_in, check_out).unwrap(),
            1,
            Decimal::new(100_000, 2),
            format!("pi_seed_{}", self.ctx.generate_id()),
        );
        self.bookings.insert_if_available(&booking).await.unwrap();
        booking
    }

    pub async fn booking(&self, id: Snowflake) -> Booking {
        self.bookings.find_by_id(id).await.unwrap().unwrap()
    }

    fn listing(&self, town: &str, max_guests: i32) -> Listing {
        Listing::new(
            self.ctx.generate_id(),
            self.ctx.generate_id(),
            format!("Stay in {town}"),
            "Sea-facing rooms".to_string(),
            Location {
                address: "12 Beach Road".to_string(),
                town: town.to_string(),
                district: format!("{town} District"),
                state: "Kerala".to_string(),
                pincode: None,
            },
            Capacity {
                max_guests,
                bedrooms: 1,
                beds: max_guests,
                bathrooms: 1,
            },
            Decimal::new(1500, 0),
            Vec::new(),
        )
    }
}
