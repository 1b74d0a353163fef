use tracing::info;

use crate::config::AppConfig;
use crate::error::Result;
use crate::health::{DatabaseHealthCheck, TargetSet};
use crate::readiness::{ReadinessWaiter, StatusReporter, WaitState};

/// Waits until the `default` database accepts connections.
pub async fn db_wait_service<R>(config: &AppConfig, reporter: &mut R) -> Result<WaitState>
where
    R: StatusReporter + ?Sized,
{
    let check = DatabaseHealthCheck::from_config(config);
    let waiter = ReadinessWaiter::from_config(&config.wait);

    match waiter.max_attempts() {
        Some(max) => info!(
            "Polling every {:?}, giving up after {} attempts",
            waiter.interval(),
            max
        ),
        None => info!("Polling every {:?} with no attempt limit", waiter.interval()),
    }

    let state = waiter
        .wait_until_ready(&check, &TargetSet::default_database(), reporter)
        .await?;

    Ok(state)
}
