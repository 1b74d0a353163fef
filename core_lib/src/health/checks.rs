//! Readiness probes and the errors they report

use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_DATABASE: &str = "default";

/// Logical names of the resources a probe checks, e.g. `{"default"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSet {
    names: BTreeSet<String>,
}

impl TargetSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn default_database() -> Self {
        Self::new([DEFAULT_DATABASE])
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for TargetSet {
    fn default() -> Self {
        Self::default_database()
    }
}

impl fmt::Display for TargetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// The dependency is not ready yet. Both variants are retried the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("database is not accepting connections: {0}")]
    NotListening(String),

    #[error("database is not provisioned yet: {0}")]
    NotProvisioned(String),
}

#[derive(Error, Debug)]
pub enum CheckError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Fatal(anyhow::Error),
}

impl CheckError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, CheckError::Connection(_))
    }
}

#[async_trait::async_trait]
pub trait HealthCheck: Send + Sync {
    /// Probes every target once. `Ok(())` means all of them accept connections.
    async fn check(&self, targets: &TargetSet) -> Result<(), CheckError>;

    fn name(&self) -> &str;
}
