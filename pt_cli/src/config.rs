//! Host configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use poker_tools::db::DatabaseConfig;
use std::{fmt, str::FromStr};

/// Where game state is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process memory; games vanish on exit
    Memory,
    /// PostgreSQL via `DATABASE_URL`
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(StoreBackend::Memory),
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            other => Err(ConfigError::Invalid {
                var: "POKER_STORE".to_string(),
                reason: format!("Unknown store {other:?}, expected memory or postgres"),
            }),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Postgres => write!(f, "postgres"),
        }
    }
}

/// Complete host configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Game state backend
    pub store: StoreBackend,
    /// Database configuration, used by the postgres backend
    pub database: DatabaseConfig,
    /// Inbox capacity of each table actor
    pub mailbox_capacity: usize,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `store_override` - Optional store backend override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<AppConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but unparseable
    pub fn from_env(
        store_override: Option<StoreBackend>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let store = match store_override {
            Some(store) => store,
            None => match std::env::var("POKER_STORE") {
                Ok(value) => value.parse()?,
                Err(_) => StoreBackend::Memory,
            },
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        let mailbox_capacity = parse_env_or(
            "TABLE_MAILBOX_CAPACITY",
            poker_tools::table::DEFAULT_MAILBOX_CAPACITY,
        );

        Ok(AppConfig {
            store,
            database,
            mailbox_capacity,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mailbox_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "TABLE_MAILBOX_CAPACITY".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.store == StoreBackend::Postgres {
            if self.database.database_url.trim().is_empty() {
                return Err(ConfigError::MissingRequired {
                    var: "DATABASE_URL".to_string(),
                    hint: "Set it or pass --db-url when using --store postgres".to_string(),
                });
            }

            if self.database.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }

            if self.database.min_connections > self.database.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed max connections ({})",
                        self.database.max_connections
                    ),
                });
            }

            if self.database.query_timeout_secs == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_QUERY_TIMEOUT_SECS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn config(store: StoreBackend) -> AppConfig {
        AppConfig {
            store,
            database: DatabaseConfig {
                database_url: "postgres://localhost/test".to_string(),
                ..DatabaseConfig::development()
            },
            mailbox_capacity: 64,
        }
    }

    fn clear_env() {
        // SAFETY: tests touching the environment are serialized.
        unsafe {
            std::env::remove_var("POKER_STORE");
            std::env::remove_var("TABLE_MAILBOX_CAPACITY");
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "DATABASE_URL".to_string(),
            hint: "Pass --db-url".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DATABASE_URL"));
        assert!(msg.contains("Pass --db-url"));
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!(" PG ".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert!(matches!(
            "redis".parse::<StoreBackend>(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_config_validation_zero_mailbox() {
        let mut config = config(StoreBackend::Memory);
        config.mailbox_capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_config_validation_postgres_needs_url() {
        let mut config = config(StoreBackend::Postgres);
        config.database.database_url = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired { .. })
        ));

        let mut memory = config.clone();
        memory.store = StoreBackend::Memory;
        assert!(memory.validate().is_ok());
    }

    #[test]
    fn test_config_validation_pool_bounds() {
        let mut config = config(StoreBackend::Postgres);
        config.database.min_connections = config.database.max_connections + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_to_memory() {
        clear_env();
        let config = AppConfig::from_env(None, None).unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(
            config.mailbox_capacity,
            poker_tools::table::DEFAULT_MAILBOX_CAPACITY
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_and_overrides() {
        clear_env();
        // SAFETY: serialized with the other environment tests.
        unsafe {
            std::env::set_var("POKER_STORE", "postgres");
            std::env::set_var("TABLE_MAILBOX_CAPACITY", "8");
        }

        let config = AppConfig::from_env(None, Some("postgres://override/db".to_string())).unwrap();
        assert_eq!(config.store, StoreBackend::Postgres);
        assert_eq!(config.mailbox_capacity, 8);
        assert_eq!(config.database.database_url, "postgres://override/db");

        let config = AppConfig::from_env(Some(StoreBackend::Memory), None).unwrap();
        assert_eq!(config.store, StoreBackend::Memory);

        // SAFETY: as above.
        unsafe {
            std::env::set_var("POKER_STORE", "nonsense");
        }
        assert!(AppConfig::from_env(None, None).is_err());
        clear_env();
    }
}
