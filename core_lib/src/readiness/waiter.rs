//! Blocks startup until a readiness check passes.

use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::events::{StatusReporter, WaitEvent};
use super::state::{WaitPhase, WaitState};
use crate::config::WaitConfig;
use crate::health::{CheckError, ConnectionError, HealthCheck, TargetSet};

/// Shortest pause between probes; anything below is raised to this.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Error, Debug)]
pub enum WaitError {
    #[error(transparent)]
    Fatal(anyhow::Error),

    #[error("Database still unavailable after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: ConnectionError },
}

#[derive(Debug, Clone)]
pub struct ReadinessWaiter {
    interval: Duration,
    max_attempts: Option<u32>,
}

impl Default for ReadinessWaiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl ReadinessWaiter {
    pub fn new(interval: Duration) -> Self {
        if interval < MIN_INTERVAL {
            warn!("Wait interval {:?} is below {:?}, using the minimum", interval, MIN_INTERVAL);
        }

        Self {
            interval: interval.max(MIN_INTERVAL),
            max_attempts: None,
        }
    }

    pub fn from_config(config: &WaitConfig) -> Self {
        Self::new(config.interval()).with_max_attempts(config.max_attempts)
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Probes `targets` until the check passes, sleeping `interval` after each
    /// connectivity failure. Any other error is returned on the spot.
    pub async fn wait_until_ready<C, R>(
        &self,
        check: &C,
        targets: &TargetSet,
        reporter: &mut R,
    ) -> Result<WaitState, WaitError>
    where
        C: HealthCheck + ?Sized,
        R: StatusReporter + ?Sized,
    {
        let mut state = WaitState::new();

        info!("Waiting for {} {}", check.name(), targets);
        reporter.report(&WaitEvent::Started {
            targets: targets.clone(),
        });

        loop {
            transition(state.phase(), WaitPhase::Checking);

            match check.check(targets).await {
                Ok(()) => {
                    transition(WaitPhase::Checking, WaitPhase::Ready);
                    state.mark_ready();
                    info!(
                        "{} {} available after {} failed attempts",
                        check.name(),
                        targets,
                        state.attempts
                    );
                    reporter.report(&WaitEvent::Available {
                        attempts: state.attempts,
                    });
                    return Ok(state);
                }
                Err(CheckError::Connection(err)) => {
                    transition(WaitPhase::Checking, WaitPhase::Pending);
                    let attempt = state.next_attempt();

                    if self.max_attempts.is_some_and(|max| attempt >= max) {
                        error!("Giving up on {} after {} attempts: {}", targets, attempt, err);
                        return Err(WaitError::Exhausted {
                            attempts: attempt,
                            last: err,
                        });
                    }

                    warn!(
                        "{} unavailable (attempt {}): {}; retrying in {:?}",
                        targets, attempt, err, self.interval
                    );
                    reporter.report(&WaitEvent::Unavailable {
                        attempt,
                        retry_in: self.interval,
                        reason: err.to_string(),
                    });

                    tokio::time::sleep(self.interval).await;
                    state.record_failure();
                }
                Err(CheckError::Fatal(err)) => {
                    error!("Readiness check for {} failed: {:#}", targets, err);
                    return Err(WaitError::Fatal(err));
                }
            }
        }
    }
}

fn transition(from: WaitPhase, to: WaitPhase) {
    debug_assert!(from.can_transition_to(to), "invalid readiness transition {} -> {}", from, to);
    debug!("Readiness {} -> {}", from, to);
}
