//! Completion sweep scheduler
//!
//! Moves Booked reservations whose checkout has passed to Completed.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use stay_common::SchedulerConfig;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument};

use super::booking::BookingService;
use super::context::ServiceContext;
use super::error::ServiceResult;

/// One sweep pass against "today" in UTC
pub struct SweepService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SweepService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn run_once(&self) -> ServiceResult<u64> {
        self.run_as_of(Utc::now().date_naive()).await
    }

    #[instrument(skip(self))]
    pub async fn run_as_of(&self, today: NaiveDate) -> ServiceResult<u64> {
        BookingService::new(self.ctx).complete_past_due(today).await
    }
}

/// Run the sweep every `sweep_interval_secs`, forever.
///
/// The first pass happens immediately when `run_on_startup` is set. Failures
/// are logged and the loop carries on with the next tick.
pub async fn run_sweep_loop(ctx: ServiceContext, config: SchedulerConfig) {
    let period = Duration::from_secs(config.sweep_interval_secs.max(1));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    if !config.run_on_startup {
        // The first tick completes immediately
        interval.tick().await;
    }

    info!(interval_secs = period.as_secs(), "Completion sweep scheduled");
    loop {
        interval.tick().await;

        match SweepService::new(&ctx).run_once().await {
            Ok(completed) => info!(completed, "Completion sweep finished"),
            Err(e) => error!(error = %e, "Completion sweep failed"),
        }
    }
}
