pub mod checks;
pub mod database;


pub use checks::{CheckError, ConnectionError, HealthCheck, TargetSet, DEFAULT_DATABASE};
pub use database::{classify_sqlx_error, DatabaseHealthCheck};
