//! Server setup and initialization

use std::sync::Arc;

use stay_common::{AppConfig, AppError, AppResult, JwtVerifier};
use stay_core::{EventSink, SnowflakeGenerator};
use stay_db::{
    create_pool, default_migrations_dir, run_migrations, PgBookingRepository,
    PgConversationRepository, PgListingRepository, PgReviewRepository, PoolConfig,
};
use stay_gateway::ConnectionRegistry;
use stay_service::{
    run_sweep_loop, LocalMediaStorage, PaymentCoordinator, ServiceContextBuilder, StripeGateway,
    TracingNotifier,
};
use tracing::{info, warn};

use crate::state::AppState;

/// Initialize all dependencies and create `AppState`
pub async fn create_app_state(config: AppConfig) -> AppResult<AppState> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    if config.database.run_migrations {
        run_migrations(&pool, &default_migrations_dir())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
    }

    let gateway = StripeGateway::from_config(&config.payment)
        .map_err(|e| AppError::Config(format!("payment provider client: {e}")))?;
    let payments = PaymentCoordinator::from_config(Arc::new(gateway), &config.payment);

    let media_storage = LocalMediaStorage::from_config(&config.storage).await?;
    info!(dir = %media_storage.dir().display(), "Media storage ready");

    let registry = ConnectionRegistry::new_shared();
    let events: Arc<dyn EventSink> = registry.clone();

    let ctx = ServiceContextBuilder::new()
        .listing_repo(Arc::new(PgListingRepository::new(pool.clone())))
        .booking_repo(Arc::new(PgBookingRepository::new(pool.clone())))
        .conversation_repo(Arc::new(PgConversationRepository::new(pool.clone())))
        .review_repo(Arc::new(PgReviewRepository::new(pool)))
        .payments(Arc::new(payments))
        .media_storage(Arc::new(media_storage))
        .notifier(Arc::new(TracingNotifier))
        .events(events)
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let verifier = Arc::new(JwtVerifier::from_config(&config.jwt));

    Ok(AppState::new(ctx, registry, verifier, config.scheduler))
}

/// Run the background scheduler until a shutdown signal arrives
pub async fn run(config: AppConfig) -> AppResult<()> {
    let state = create_app_state(config).await?;

    info!(
        interval_secs = state.scheduler.sweep_interval_secs,
        run_on_startup = state.scheduler.run_on_startup,
        "Starting completion sweep"
    );
    let sweep = tokio::spawn(run_sweep_loop(state.ctx.clone(), state.scheduler.clone()));

    tokio::signal::ctrl_c()
        .await
        .map_err(AppError::internal)?;

    info!("Shutdown signal received");
    sweep.abort();
    if let Err(e) = sweep.await {
        if !e.is_cancelled() {
            warn!(error = %e, "Completion sweep task ended abnormally");
        }
    }

    let dropped = state.registry.total_connections();
    if dropped > 0 {
        info!(connections = dropped, "Dropping live connections");
    }

    Ok(())
}
