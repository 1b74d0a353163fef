use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use super::checks::{CheckError, ConnectionError, HealthCheck, TargetSet};
use crate::config::AppConfig;

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const SQLITE_CANTOPEN: i32 = 14;
const SQLITE_NOTADB: i32 = 26;

/// Opens a fresh connection to each requested database and reads its header.
#[derive(Debug, Clone)]
pub struct DatabaseHealthCheck {
    databases: BTreeMap<String, String>,
    connect_timeout: Duration,
}

impl DatabaseHealthCheck {
    pub fn new(databases: BTreeMap<String, String>, connect_timeout: Duration) -> Self {
        Self {
            databases,
            connect_timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let databases = config
            .databases
            .iter()
            .map(|(alias, db)| (alias.clone(), db.url.clone()))
            .collect();

        Self::new(databases, config.wait.connect_timeout())
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.databases.keys().map(String::as_str)
    }

    async fn probe(&self, alias: &str, url: &str) -> Result<(), CheckError> {
        debug!("Probing database '{}'", alias);

        match tokio::time::timeout(self.connect_timeout, probe_sqlite(url)).await {
            Ok(result) => result.map_err(classify_sqlx_error),
            Err(_) => Err(ConnectionError::NotListening(format!(
                "no answer from '{}' within {}ms",
                alias,
                self.connect_timeout.as_millis()
            ))
            .into()),
        }
    }
}

async fn probe_sqlite(url: &str) -> Result<(), sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(false);

    let mut conn = options.connect().await?;
    // SQLite opens files lazily; this forces a read of page 1.
    sqlx::query("PRAGMA schema_version").fetch_one(&mut conn).await?;
    conn.close().await?;

    Ok(())
}

#[async_trait]
impl HealthCheck for DatabaseHealthCheck {
    async fn check(&self, targets: &TargetSet) -> Result<(), CheckError> {
        for alias in targets.iter() {
            let url = self.databases.get(alias).ok_or_else(|| {
                CheckError::Fatal(anyhow::anyhow!(
                    "The connection '{}' doesn't exist",
                    alias
                ))
            })?;

            if let Err(e) = self.probe(alias, url).await {
                if e.is_retryable() {
                    debug!("Database '{}' not ready: {}", alias, e);
                } else {
                    warn!("Database '{}' check failed: {}", alias, e);
                }
                return Err(e);
            }
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "database"
    }
}

/// Splits driver errors into "not ready yet" and everything else.
pub fn classify_sqlx_error(err: sqlx::Error) -> CheckError {
    match err {
        sqlx::Error::Io(e) => ConnectionError::NotListening(e.to_string()).into(),
        sqlx::Error::Tls(e) => ConnectionError::NotListening(e.to_string()).into(),
        err @ (sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed) => ConnectionError::NotListening(err.to_string()).into(),
        sqlx::Error::Database(db_err) => {
            let primary = db_err
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .map(|code| code & 0xff);

            match primary {
                Some(SQLITE_CANTOPEN) => {
                    ConnectionError::NotProvisioned(db_err.message().to_string()).into()
                }
                Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => {
                    ConnectionError::NotListening(db_err.message().to_string()).into()
                }
                Some(SQLITE_NOTADB) => CheckError::Fatal(anyhow::anyhow!(
                    "existing file is not a SQLite database: {}",
                    db_err.message()
                )),
                _ => CheckError::Fatal(sqlx::Error::Database(db_err).into()),
            }
        }
        other => CheckError::Fatal(other.into()),
    }
}
