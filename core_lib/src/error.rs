//! Application error types and handling

use thiserror::Error;

use crate::health::CheckError;
use crate::readiness::WaitError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database check failed: {0}")]
    Check(#[from] CheckError),

    #[error(transparent)]
    Wait(#[from] WaitError),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

impl AppError {
    /// True when the failure came from the database not being reachable yet,
    /// as opposed to a configuration or programming error.
    pub fn is_connectivity(&self) -> bool {
        match self {
            AppError::Check(err) => err.is_retryable(),
            AppError::Wait(WaitError::Exhausted { .. }) => true,
            _ => false,
        }
    }
}
