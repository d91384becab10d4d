//! # Store Handle
//!
//! Opens the rental database and hands out repositories and transactions.
//!
//! ## Connection Settings
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Rental Store Connections                           │
//! │                                                                         │
//! │  DbConfig ──► connect_options()   WAL · synchronous=NORMAL ·            │
//! │     │                             foreign_keys=ON · busy_timeout        │
//! │     │                                                                   │
//! │     └──────► pool_options()       max/min connections ·                 │
//! │                                   acquire + idle timeouts               │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │               Database { pool }                                         │
//! │                ├── cars(), bookings(), ...   reads outside a tx         │
//! │                └── begin() ─► StoreTx        every lifecycle write      │
//! │                                                                         │
//! │  Readers share the pool freely under WAL. Writers line up on            │
//! │  BEGIN IMMEDIATE and wait at most busy_timeout for the lock.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::{
    BookingRepository, BookingTypeRepository, CarRepository, CustomerRepository,
    DriverRepository, IncentiveRepository, MembershipRepository,
};
use crate::tx::StoreTx;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Store settings.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("./data/rental.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first connect. `:memory:` for a private
    /// in-memory store.
    pub database_path: PathBuf,

    /// Upper bound of pooled connections (default 5).
    pub max_connections: u32,

    /// Connections kept open while idle (default 1).
    pub min_connections: u32,

    /// How long an operation waits for a pooled connection (default 30s).
    pub connect_timeout: Duration,

    /// How long an unused connection stays open (default 10 min).
    pub idle_timeout: Duration,

    /// How long a writer waits for another writer's lock (default 5s).
    pub busy_timeout: Duration,

    /// Apply pending migrations when opening (default true).
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// A fresh private store that disappears with its pool.
    ///
    /// An in-memory SQLite database lives inside one connection, so the pool
    /// is pinned to exactly one.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            ..DbConfig::new(MEMORY_PATH)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }

    /// Per-connection SQLite settings.
    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        // mode=rwc: open read-write, create when missing
        let url = format!("sqlite://{}?mode=rwc", self.database_path.display());

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(format!("{}: {}", url, e)))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout)
            .create_if_missing(true);

        Ok(options)
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let max_connections = if self.is_in_memory() {
            1
        } else {
            self.max_connections
        };

        SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(self.min_connections.min(max_connections))
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(Some(self.idle_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Open rental store. Clones share one pool.
///
/// ## Usage
/// ```rust,ignore
/// let car = db.cars().get_by_id(&car_id).await?;
///
/// let mut tx = db.begin().await?;
/// tx.reserve_car_unit(&car_id).await?;
/// tx.commit().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the store described by `config`, migrating it when asked to.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            in_memory = config.is_in_memory(),
            "Opening rental store"
        );

        let connect_options = config.connect_options()?;
        let pool = config
            .pool_options()
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(
            max_connections = config.max_connections,
            busy_timeout_ms = config.busy_timeout.as_millis() as u64,
            "Store pool ready"
        );

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending schema migrations.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Underlying pool, for diagnostics and ad-hoc statements.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Opens a write transaction.
    ///
    /// Blocks (up to the busy timeout) while another writer holds the lock.
    pub async fn begin(&self) -> DbResult<StoreTx> {
        StoreTx::begin(&self.pool).await
    }

    pub fn memberships(&self) -> MembershipRepository {
        MembershipRepository::new(self.pool.clone())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    pub fn cars(&self) -> CarRepository {
        CarRepository::new(self.pool.clone())
    }

    pub fn drivers(&self) -> DriverRepository {
        DriverRepository::new(self.pool.clone())
    }

    pub fn booking_types(&self) -> BookingTypeRepository {
        BookingTypeRepository::new(self.pool.clone())
    }

    pub fn bookings(&self) -> BookingRepository {
        BookingRepository::new(self.pool.clone())
    }

    pub fn incentives(&self) -> IncentiveRepository {
        IncentiveRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections and closes the pool. Later calls
    /// fail with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing rental store");
        self.pool.close().await;
    }

    /// True when a trivial statement succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
