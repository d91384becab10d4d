//! # Store Errors
//!
//! Everything a store call can fail with.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error / MigrateError                                             │
//! │       │  classified by From impls below                                 │
//! │       ▼                                                                 │
//! │  DbError                                                                │
//! │       │  NotFound → NOT_FOUND, everything else → INTERNAL               │
//! │       ▼                                                                 │
//! │  rental_service::ServiceError                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Store operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// A row that had to exist was absent, e.g. a car joined into a booking
    /// view.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the row (membership name, booking type label,
    /// national ID).
    #[error("{field} must be unique, '{value}' is taken")]
    UniqueViolation { field: String, value: String },

    /// A reference points at a missing row, or a referenced row was removed.
    #[error("Foreign key constraint failed: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK constraint rejected the row (negative stock, end before start).
    #[error("Check constraint failed: {message}")]
    CheckViolation { message: String },

    /// The database file could not be opened or the pool is closed.
    #[error("Cannot open rental store: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    /// Any other statement failure reported by SQLite.
    #[error("Statement failed: {0}")]
    QueryFailed(String),

    /// Another writer held the lock past the busy timeout.
    #[error("Rental store is busy: {0}")]
    Busy(String),

    /// No pooled connection became free within the acquire timeout.
    #[error("No store connection available")]
    PoolExhausted,

    #[error("Unexpected store error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Classifies sqlx failures.
///
/// ```text
/// RowNotFound                      → NotFound
/// Database, kind UniqueViolation   → UniqueViolation  (column from message)
/// Database, kind ForeignKey/Check  → ForeignKeyViolation / CheckViolation
/// Database, "database is locked"   → Busy
/// Database, anything else          → QueryFailed
/// PoolTimedOut / PoolClosed        → PoolExhausted / ConnectionFailed
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "<none>"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => {
                        // "UNIQUE constraint failed: memberships.name"
                        let field = message
                            .rsplit(": ")
                            .next()
                            .unwrap_or("unknown")
                            .to_string();
                        DbError::duplicate(field, "")
                    }
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    ErrorKind::CheckViolation => DbError::CheckViolation { message },
                    _ if message.contains("database is locked") => DbError::Busy(message),
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
