use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::health::DEFAULT_DATABASE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub databases: BTreeMap<String, DatabaseConfig>,
    pub wait: WaitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    pub interval_ms: u64,
    /// `None` keeps waiting until the database shows up.
    pub max_attempts: Option<u32>,
    pub connect_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut databases = BTreeMap::new();
        databases.insert(DEFAULT_DATABASE.to_string(), DatabaseConfig::default());

        Self {
            databases,
            wait: WaitConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:./data.db".to_string(),
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_attempts: None,
            connect_timeout_ms: 5000,
        }
    }
}

impl WaitConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder = builder.set_override_option(
            format!("databases.{}.url", DEFAULT_DATABASE),
            std::env::var("DATABASE_URL").ok(),
        )?;

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.databases.contains_key(DEFAULT_DATABASE) {
            return Err(ConfigError::Message(format!(
                "A '{}' database must be configured",
                DEFAULT_DATABASE
            )));
        }

        for (alias, database) in &self.databases {
            if database.url.is_empty() {
                return Err(ConfigError::Message(format!(
                    "Database URL for '{}' cannot be empty",
                    alias
                )));
            }

            if !database.url.starts_with("sqlite:") {
                return Err(ConfigError::Message(format!(
                    "Database URL for '{}' must use the sqlite: scheme",
                    alias
                )));
            }
        }

        if self.wait.interval_ms == 0 {
            return Err(ConfigError::Message(
                "Wait interval must be greater than 0".to_string(),
            ));
        }

        if self.wait.max_attempts == Some(0) {
            return Err(ConfigError::Message(
                "Max attempts must be greater than 0 when set".to_string(),
            ));
        }

        if self.wait.connect_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "Connect timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn database_url(&self, alias: &str) -> Option<&str> {
        self.databases.get(alias).map(|db| db.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};

    // Config loading reads process-wide env vars.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct EnvVars {
        keys: Vec<&'static str>,
        _lock: MutexGuard<'static, ()>,
    }

    impl EnvVars {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
            Self {
                keys: vars.iter().map(|(key, _)| *key).collect(),
                _lock: lock,
            }
        }
    }

    impl Drop for EnvVars {
        fn drop(&mut self) {
            for key in &self.keys {
                std::env::remove_var(key);
            }
        }
    }

    fn no_config_file() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database_url("default"), Some("sqlite:./data.db"));
        assert_eq!(config.wait.interval(), Duration::from_secs(1));
        assert_eq!(config.wait.max_attempts, None);
        assert_eq!(config.wait.connect_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.wait.interval_ms = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.wait.max_attempts = Some(0);
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.wait.max_attempts = Some(10);
        assert!(config.validate().is_ok());

        config = AppConfig::default();
        config.wait.connect_timeout_ms = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.databases.clear();
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.databases.insert(
            "default".to_string(),
            DatabaseConfig { url: String::new() },
        );
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.databases.insert(
            "default".to_string(),
            DatabaseConfig {
                url: "postgres://localhost/app".to_string(),
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_overrides() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[wait]
interval_ms = 250
max_attempts = 30

[databases.replica]
url = "sqlite:./replica.db"
"#
        )
        .unwrap();

        let _env = EnvVars::set(&[]);
        let config = AppConfig::load_from(file.path()).expect("Should load config file");

        assert_eq!(config.wait.interval(), Duration::from_millis(250));
        assert_eq!(config.wait.max_attempts, Some(30));
        assert_eq!(config.wait.connect_timeout_ms, 5000);
        assert_eq!(config.database_url("replica"), Some("sqlite:./replica.db"));
        assert!(config.database_url("default").is_some());
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let _env = EnvVars::set(&[]);
        let (_dir, path) = no_config_file();
        let config = AppConfig::load_from(&path).expect("Should load default configuration");

        assert!(config.validate().is_ok());
        assert_eq!(config.wait.interval_ms, 1000);
        assert!(config.database_url("default").is_some());
    }

    #[test]
    fn test_environment_overrides() {
        let _env = EnvVars::set(&[
            ("APP_WAIT__INTERVAL_MS", "250"),
            ("APP_WAIT__MAX_ATTEMPTS", "5"),
            ("APP_DATABASES__DEFAULT__URL", "sqlite:/tmp/from-app-env.db"),
        ]);
        let (_dir, path) = no_config_file();

        let config = AppConfig::load_from(&path).expect("Should load env configuration");

        assert_eq!(config.wait.interval(), Duration::from_millis(250));
        assert_eq!(config.wait.max_attempts, Some(5));
        assert_eq!(config.database_url("default"), Some("sqlite:/tmp/from-app-env.db"));
    }

    #[test]
    fn test_database_url_takes_precedence() {
        let _env = EnvVars::set(&[
            ("APP_DATABASES__DEFAULT__URL", "sqlite:/tmp/from-app-env.db"),
            ("DATABASE_URL", "sqlite:/tmp/from-database-url.db"),
        ]);
        let (_dir, path) = no_config_file();

        let config = AppConfig::load_from(&path).expect("Should load env configuration");

        assert_eq!(config.database_url("default"), Some("sqlite:/tmp/from-database-url.db"));
    }

    #[test]
    fn test_invalid_environment_override_is_rejected() {
        let _env = EnvVars::set(&[("APP_WAIT__INTERVAL_MS", "0")]);
        let (_dir, path) = no_config_file();

        assert!(AppConfig::load_from(&path).is_err());
    }
}
