//! Startup tooling for the service: database readiness checks, the wait loop
//! that blocks until the database accepts connections, and the management
//! commands that expose them.

pub mod commands;
pub mod config;
pub mod error;
pub mod health;
pub mod readiness;

pub use commands::ManagementCommand;
pub use config::{AppConfig, DatabaseConfig, WaitConfig};
pub use error::{AppError, Result};
pub use health::{CheckError, ConnectionError, DatabaseHealthCheck, HealthCheck, TargetSet};
pub use readiness::{LineReporter, ReadinessWaiter, StatusReporter, WaitError, WaitEvent, WaitPhase, WaitState};
