use tracing::info;

use crate::config::AppConfig;
use crate::error::Result;
use crate::health::{DatabaseHealthCheck, HealthCheck, TargetSet};
use crate::readiness::{StatusReporter, WaitEvent};

/// Single probe of the `default` database, no retries.
pub async fn check<R>(config: &AppConfig, reporter: &mut R) -> Result<()>
where
    R: StatusReporter + ?Sized,
{
    let health_check = DatabaseHealthCheck::from_config(config);
    let targets = TargetSet::default_database();

    info!("Checking {} {}", health_check.name(), targets);
    health_check.check(&targets).await?;

    reporter.report(&WaitEvent::Available { attempts: 0 });
    Ok(())
}
