//! Notifier that writes notifications to the log

use async_trait::async_trait;
use stay_core::{DomainError, Notifier, Snowflake};
use tracing::info;

/// Stands in for email or push delivery, which lives outside this system
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, to: Snowflake, subject: &str, body: &str) -> Result<(), DomainError> {
        info!(target: "stay::notify", user_id = %to, subject, body, "Notification");
        Ok(())
    }
}
