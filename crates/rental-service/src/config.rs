//! # Service Configuration
//!
//! Loads service settings from environment variables.
//!
//! ## Variables
//! ```text
//! ┌──────────────────────────────────┬──────────────────────────────────────┐
//! │ Variable                         │ Default                              │
//! ├──────────────────────────────────┼──────────────────────────────────────┤
//! │ RENTAL_DB_PATH                   │ ./rental.db                          │
//! │ RENTAL_DB_MAX_CONNECTIONS        │ 5                                    │
//! │ RENTAL_DB_ACQUIRE_TIMEOUT_SECS   │ 30                                   │
//! │ RENTAL_DB_BUSY_TIMEOUT_SECS      │ 5                                    │
//! │ RENTAL_AUTO_MIGRATE              │ true                                 │
//! │ RENTAL_SEED_DEFAULTS             │ true                                 │
//! │ RENTAL_LOG_FILTER                │ info,rental=debug,sqlx=warn          │
//! └──────────────────────────────────┴──────────────────────────────────────┘
//! ```

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rental_db::DbConfig;

/// Default tracing filter when neither `RUST_LOG` nor `RENTAL_LOG_FILTER` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,rental=debug,sqlx=warn";

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// How long an operation waits for a pooled connection
    pub acquire_timeout: Duration,

    /// How long a writer waits for another writer's lock
    pub busy_timeout: Duration,

    /// Apply pending migrations on connect
    pub auto_migrate: bool,

    /// Insert default memberships and booking types on connect
    pub seed_defaults: bool,

    /// Tracing filter directive
    pub log_filter: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            database_path: PathBuf::from("./rental.db"),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            auto_migrate: true,
            seed_defaults: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServiceConfig::default();

        let database_path = lookup("RENTAL_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let max_connections =
            parse_var(&lookup, "RENTAL_DB_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections);
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue("RENTAL_DB_MAX_CONNECTIONS".to_string()));
        }

        let acquire_timeout = parse_var::<u64, _>(&lookup, "RENTAL_DB_ACQUIRE_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.acquire_timeout);

        let busy_timeout = parse_var::<u64, _>(&lookup, "RENTAL_DB_BUSY_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.busy_timeout);

        let auto_migrate =
            parse_var(&lookup, "RENTAL_AUTO_MIGRATE")?.unwrap_or(defaults.auto_migrate);

        let seed_defaults =
            parse_var(&lookup, "RENTAL_SEED_DEFAULTS")?.unwrap_or(defaults.seed_defaults);

        let log_filter = lookup("RENTAL_LOG_FILTER").unwrap_or(defaults.log_filter);

        Ok(ServiceConfig {
            database_path,
            max_connections,
            acquire_timeout,
            busy_timeout,
            auto_migrate,
            seed_defaults,
            log_filter,
        })
    }

    /// Derives the store configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .connect_timeout(self.acquire_timeout)
            .busy_timeout(self.busy_timeout)
            .run_migrations(self.auto_migrate)
    }
}

fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(var.to_string()))
        })
        .transpose()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
