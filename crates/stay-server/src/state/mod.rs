//! Application state shared by every outer surface

use std::sync::Arc;

use stay_common::{AppError, AppResult, SchedulerConfig};
use stay_core::{Actor, TokenVerifier};
use stay_gateway::{ConnectionId, ConnectionRegistry, GatewayMessage};
use stay_service::ServiceContext;
use tokio::sync::mpsc;
use tracing::info;

/// Everything a transport needs to serve requests and live connections
#[derive(Clone)]
pub struct AppState {
    /// Service context
    pub ctx: ServiceContext,

    /// Live connections, also installed as the context's event sink
    pub registry: Arc<ConnectionRegistry>,

    /// Bearer token verifier
    pub verifier: Arc<dyn TokenVerifier>,

    pub scheduler: SchedulerConfig,
}

impl AppState {
    pub fn new(
        ctx: ServiceContext,
        registry: Arc<ConnectionRegistry>,
        verifier: Arc<dyn TokenVerifier>,
        scheduler: SchedulerConfig,
    ) -> Self {
        Self {
            ctx,
            registry,
            verifier,
            scheduler,
        }
    }

    /// Resolve a bearer token to the acting user
    pub fn authenticate(&self, token: &str) -> AppResult<Actor> {
        self.verifier.verify(token).map_err(AppError::from)
    }

    /// Authenticate and open a live connection for the token's user
    pub fn open_connection(
        &self,
        token: &str,
    ) -> AppResult<(Actor, ConnectionId, mpsc::Receiver<GatewayMessage>)> {
        let actor = self.authenticate(token)?;
        let (connection_id, rx) = self.registry.connect(actor.id);

        info!(user_id = %actor.id, connection_id = %connection_id, "Live connection opened");

        Ok((actor, connection_id, rx))
    }

    pub fn close_connection(&self, connection_id: ConnectionId) {
        self.registry.disconnect(connection_id);
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("registry", &self.registry)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}
