//! Service context - dependency container for services
//!
//! Holds all repositories, collaborators and the ID generator needed by services.

use std::sync::Arc;

use stay_core::traits::{
    BookingRepository, ConversationRepository, EventSink, ListingRepository, MediaStorage,
    Notifier, ReviewRepository,
};
use stay_core::{DomainEvent, Snowflake, SnowflakeGenerator};
use tracing::{debug, warn};

use crate::payment::PaymentCoordinator;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the dependency container passed to every service. It provides:
/// - Repositories for listings, bookings, conversations and reviews
/// - The payment coordinator
/// - Media storage, the notifier and the real-time event sink
/// - The Snowflake generator for ID generation
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    listing_repo: Arc<dyn ListingRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    conversation_repo: Arc<dyn ConversationRepository>,
    review_repo: Arc<dyn ReviewRepository>,

    // Collaborators
    payments: Arc<PaymentCoordinator>,
    media_storage: Arc<dyn MediaStorage>,
    notifier: Arc<dyn Notifier>,
    events: Arc<dyn EventSink>,

    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        listing_repo: Arc<dyn ListingRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        conversation_repo: Arc<dyn ConversationRepository>,
        review_repo: Arc<dyn ReviewRepository>,
        payments: Arc<PaymentCoordinator>,
        media_storage: Arc<dyn MediaStorage>,
        notifier: Arc<dyn Notifier>,
        events: Arc<dyn EventSink>,
        snowflake_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            listing_repo,
            booking_repo,
            conversation_repo,
            review_repo,
            payments,
            media_storage,
            notifier,
            events,
            snowflake_generator,
        }
    }

    // === Repositories ===

    pub fn listing_repo(&self) -> &dyn ListingRepository {
        self.listing_repo.as_ref()
    }

    pub fn booking_repo(&self) -> &dyn BookingRepository {
        self.booking_repo.as_ref()
    }

    pub fn conversation_repo(&self) -> &dyn ConversationRepository {
        self.conversation_repo.as_ref()
    }

    pub fn review_repo(&self) -> &dyn ReviewRepository {
        self.review_repo.as_ref()
    }

    // === Collaborators ===

    pub fn payments(&self) -> &PaymentCoordinator {
        self.payments.as_ref()
    }

    pub fn media_storage(&self) -> &dyn MediaStorage {
        self.media_storage.as_ref()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn events(&self) -> &dyn EventSink {
        self.events.as_ref()
    }

    /// Get the snowflake ID generator
    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    /// Push an event to every live connection of `user_id`
    pub fn publish(&self, user_id: Snowflake, event: &DomainEvent) -> usize {
        let reached = self.events.deliver(user_id, event);
        debug!(%user_id, event = event.event_type(), reached, "Event delivered");
        reached
    }

    /// Send an out-of-band notification; failures are logged and dropped
    pub async fn notify(&self, to: Snowflake, subject: &str, body: &str) {
        if let Err(e) = self.notifier.send(to, subject, body).await {
            warn!(%to, subject, error = %e, "Notification failed");
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("payments", &self.payments)
            .field("worker_id", &self.snowflake_generator.worker_id())
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    listing_repo: Option<Arc<dyn ListingRepository>>,
    booking_repo: Option<Arc<dyn BookingRepository>>,
    conversation_repo: Option<Arc<dyn ConversationRepository>>,
    review_repo: Option<Arc<dyn ReviewRepository>>,
    payments: Option<Arc<PaymentCoordinator>>,
    media_storage: Option<Arc<dyn MediaStorage>>,
    notifier: Option<Arc<dyn Notifier>>,
    events: Option<Arc<dyn EventSink>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listing_repo(mut self, repo: Arc<dyn ListingRepository>) -> Self {
        self.listing_repo = Some(repo);
        self
    }

    pub fn booking_repo(mut self, repo: Arc<dyn BookingRepository>) -> Self {
        self.booking_repo = Some(repo);
        self
    }

    pub fn conversation_repo(mut self, repo: Arc<dyn ConversationRepository>) -> Self {
        self.conversation_repo = Some(repo);
        self
    }

    pub fn review_repo(mut self, repo: Arc<dyn ReviewRepository>) -> Self {
        self.review_repo = Some(repo);
        self
    }

    pub fn payments(mut self, payments: Arc<PaymentCoordinator>) -> Self {
        self.payments = Some(payments);
        self
    }

    pub fn media_storage(mut self, storage: Arc<dyn MediaStorage>) -> Self {
        self.media_storage = Some(storage);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.listing_repo.ok_or_else(|| ServiceError::validation("listing_repo is required"))?,
            self.booking_repo.ok_or_else(|| ServiceError::validation("booking_repo is required"))?,
            self.conversation_repo
                .ok_or_else(|| ServiceError::validation("conversation_repo is required"))?,
            self.review_repo.ok_or_else(|| ServiceError::validation("review_repo is required"))?,
            self.payments.ok_or_else(|| ServiceError::validation("payments is required"))?,
            self.media_storage.ok_or_else(|| ServiceError::validation("media_storage is required"))?,
            self.notifier.ok_or_else(|| ServiceError::validation("notifier is required"))?,
            self.events.ok_or_else(|| ServiceError::validation("events is required"))?,
            self.snowflake_generator
                .ok_or_else(|| ServiceError::validation("snowflake_generator is required"))?,
        ))
    }
}
