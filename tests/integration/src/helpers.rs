//! Test helpers for integration tests

use std::sync::Arc;

use stay_core::{Actor, EventSink, Snowflake};
use stay_gateway::ConnectionRegistry;
use stay_service::dto::ListingResponse;
use stay_service::testing::{RecordingEventSink, TestHarness};
use stay_service::{ListingService, ServiceContext};

use crate::fixtures::{listing_request, new_admin, new_user};

/// In-memory stack whose events flow through a real connection registry
pub struct LiveStack {
    pub harness: TestHarness,
    pub registry: Arc<ConnectionRegistry>,
    pub admin: Actor,
}

impl LiveStack {
    pub fn start() -> Self {
        let registry = ConnectionRegistry::new_shared();
        let sink: Arc<dyn EventSink> = registry.clone();
        let harness = TestHarness::with_events(Arc::new(RecordingEventSink::forwarding(sink)));
        Self {
            harness,
            registry,
            admin: new_admin(),
        }
    }

    pub fn ctx(&self) -> &ServiceContext {
        &self.harness.ctx
    }

    /// Submit and approve a listing through the listing service
    pub async fn approved_listing(&self, town: &str, price: i64) -> (Snowflake, ListingResponse) {
        let host = new_user();
        let listings = ListingService::new(self.ctx());
        let created = listings
            .create_listing(host.id, listing_request(town, price))
            .await
            .expect("listing submission");
        let approved = listings
            .approve_listing(&self.admin, created.id)
            .await
            .expect("listing approval");
        (host.id, approved)
    }
}

impl Default for LiveStack {
    fn default() -> Self {
        Self::start()
    }
}
