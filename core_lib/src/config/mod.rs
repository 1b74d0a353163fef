pub mod settings;

pub use settings::{AppConfig, DatabaseConfig, WaitConfig};
