//! # Database Configuration
//!
//! Pool settings, with environment profiles for loading them from the
//! process environment.
//!
//! ## Environment Variables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DIVVY_ENV                 development (default) | testing | production │
//! │  DIVVY_DATABASE_PATH       SQLite file path                             │
//! │                            development default: ./divvy_dev.db          │
//! │                            testing: ignored, always in-memory           │
//! │                            production: required                         │
//! │  DIVVY_DB_MAX_CONNECTIONS  pool size override                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default file used by the development profile.
pub const DEFAULT_DEV_DATABASE_PATH: &str = "./divvy_dev.db";

// =============================================================================
// Environment
// =============================================================================

/// Deployment profile selected by `DIVVY_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue("DIVVY_ENV".to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/divvy.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Path to the SQLite database file. Ignored when `in_memory` is set.
    pub database_path: PathBuf,

    /// Use a private in-memory database instead of a file.
    pub in_memory: bool,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Will be created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            in_memory: false,
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// The pool holds exactly one connection that is never recycled; the
    /// database lives as long as that connection.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            in_memory: true,
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    /// Loads configuration from `DIVVY_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("DIVVY_ENV") {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };

        let mut config = match environment {
            Environment::Testing => DbConfig::in_memory(),
            Environment::Development => DbConfig::new(
                lookup("DIVVY_DATABASE_PATH")
                    .unwrap_or_else(|| DEFAULT_DEV_DATABASE_PATH.to_string()),
            ),
            Environment::Production => DbConfig::new(
                lookup("DIVVY_DATABASE_PATH")
                    .filter(|path| !path.trim().is_empty())
                    .ok_or_else(|| ConfigError::MissingRequired("DIVVY_DATABASE_PATH".to_string()))?,
            ),
        };

        // In-memory pools stay at one connection
        if environment != Environment::Testing {
            if let Some(max) = lookup("DIVVY_DB_MAX_CONNECTIONS") {
                let max: u32 = max
                    .trim()
                    .parse()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| ConfigError::InvalidValue("DIVVY_DB_MAX_CONNECTIONS".to_string()))?;
                config.max_connections = max;
                config.min_connections = config.min_connections.min(max);
            }
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<DbConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DbConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.in_memory);
    }

    #[test]
    fn test_development_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DEV_DATABASE_PATH));
        assert!(!config.in_memory);
    }

    #[test]
    fn test_testing_profile_is_in_memory() {
        let config = load(&[
            ("DIVVY_ENV", "testing"),
            ("DIVVY_DATABASE_PATH", "/ignored.db"),
            ("DIVVY_DB_MAX_CONNECTIONS", "8"),
        ])
        .unwrap();
        assert!(config.in_memory);
        assert_eq!(config.max_connections, 1);
    }

    #[test]
    fn test_production_requires_path() {
        assert!(matches!(
            load(&[("DIVVY_ENV", "production")]),
            Err(ConfigError::MissingRequired(_))
        ));

        let config = load(&[
            ("DIVVY_ENV", "Production"),
            ("DIVVY_DATABASE_PATH", "/var/lib/divvy/divvy.db"),
            ("DIVVY_DB_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/divvy/divvy.db"));
        assert_eq!(config.max_connections, 12);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("DIVVY_ENV", "staging")]),
            Err(ConfigError::InvalidValue(v)) if v == "DIVVY_ENV"
        ));
        assert!(matches!(
            load(&[("DIVVY_DB_MAX_CONNECTIONS", "lots")]),
            Err(ConfigError::InvalidValue(v)) if v == "DIVVY_DB_MAX_CONNECTIONS"
        ));
        assert!(load(&[("DIVVY_DB_MAX_CONNECTIONS", "0")]).is_err());
    }
}
