//! Management commands, registered by name in [`ManagementCommand::ALL`].

pub mod check;
pub mod db_wait_service;

use std::fmt;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::readiness::StatusReporter;

pub use check::check;
pub use db_wait_service::db_wait_service;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagementCommand {
    DbWaitService,
    Check,
}

impl ManagementCommand {
    pub const ALL: [ManagementCommand; 2] = [ManagementCommand::DbWaitService, ManagementCommand::Check];

    pub fn name(&self) -> &'static str {
        match self {
            ManagementCommand::DbWaitService => "db_wait_service",
            ManagementCommand::Check => "check",
        }
    }

    pub fn about(&self) -> &'static str {
        match self {
            ManagementCommand::DbWaitService => "Wait for the database to be available",
            ManagementCommand::Check => "Check once whether the database is available",
        }
    }

    pub fn lookup(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.name() == name)
            .ok_or_else(|| AppError::UnknownCommand(name.to_string()))
    }

    pub async fn run<R>(&self, config: &AppConfig, reporter: &mut R) -> Result<()>
    where
        R: StatusReporter + ?Sized,
    {
        match self {
            ManagementCommand::DbWaitService => db_wait_service(config, reporter).await.map(|_| ()),
            ManagementCommand::Check => check(config, reporter).await,
        }
    }
}

impl fmt::Display for ManagementCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(
            ManagementCommand::lookup("db_wait_service").unwrap(),
            ManagementCommand::DbWaitService
        );
        assert_eq!(ManagementCommand::lookup("check").unwrap(), ManagementCommand::Check);
        assert!(matches!(
            ManagementCommand::lookup("runserver"),
            Err(AppError::UnknownCommand(name)) if name == "runserver"
        ));
    }

    #[test]
    fn test_command_names_are_unique() {
        for (i, a) in ManagementCommand::ALL.iter().enumerate() {
            for b in &ManagementCommand::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
            assert!(!a.about().is_empty());
            assert_eq!(a.to_string(), a.name());
        }
    }
}
