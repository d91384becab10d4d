//! # Driver Repository
//!
//! Database operations for drivers.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::generate_id;
use rental_core::{Driver, NewDriver};

// =============================================================================
// Statements
// =============================================================================

/// Looks up a driver that has not been soft-deleted.
pub(crate) async fn fetch_active(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Driver>> {
    let driver = sqlx::query_as::<_, Driver>(
        r#"
        SELECT id, name, nik, phone_number, daily_cost_cents, deleted_at, created_at
        FROM drivers
        WHERE id = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(driver)
}

/// Looks up a driver regardless of soft deletion, for historical joins.
pub(crate) async fn fetch_any(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Driver>> {
    let driver = sqlx::query_as::<_, Driver>(
        r#"
        SELECT id, name, nik, phone_number, daily_cost_cents, deleted_at, created_at
        FROM drivers
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(driver)
}

pub(crate) async fn insert(conn: &mut SqliteConnection, driver: &Driver) -> DbResult<()> {
    debug!(id = %driver.id, "Inserting driver");

    sqlx::query(
        r#"
        INSERT INTO drivers (id, name, nik, phone_number, daily_cost_cents, deleted_at, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&driver.id)
    .bind(&driver.name)
    .bind(&driver.nik)
    .bind(&driver.phone_number)
    .bind(driver.daily_cost_cents)
    .bind(driver.deleted_at)
    .bind(driver.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Sets `deleted_at`. Returns rows affected.
pub(crate) async fn soft_delete(
    conn: &mut SqliteConnection,
    id: &str,
    at: DateTime<Utc>,
) -> DbResult<u64> {
    debug!(driver_id = %id, "Soft-deleting driver");

    let result =
        sqlx::query("UPDATE drivers SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL")
            .bind(id)
            .bind(at)
            .execute(conn)
            .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for driver database operations.
#[derive(Debug, Clone)]
pub struct DriverRepository {
    pool: SqlitePool,
}

impl DriverRepository {
    /// Creates a new DriverRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DriverRepository { pool }
    }

    /// Gets a driver by ID, excluding soft-deleted ones.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Driver>> {
        let mut conn = self.pool.acquire().await?;
        fetch_active(&mut conn, id).await
    }

    /// Gets a driver by ID, including soft-deleted ones.
    pub async fn get_any(&self, id: &str) -> DbResult<Option<Driver>> {
        let mut conn = self.pool.acquire().await?;
        fetch_any(&mut conn, id).await
    }

    /// Inserts a driver. Input is expected to be validated already.
    pub async fn create(&self, input: &NewDriver) -> DbResult<Driver> {
        let driver = Driver {
            id: generate_id(),
            name: input.name.trim().to_string(),
            nik: input.nik.trim().to_string(),
            phone_number: input.phone_number.trim().to_string(),
            daily_cost_cents: input.daily_cost_cents,
            deleted_at: None,
            created_at: Utc::now(),
        };

        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, &driver).await?;

        Ok(driver)
    }

    /// Lists drivers that have not been soft-deleted, by name.
    pub async fn list(&self) -> DbResult<Vec<Driver>> {
        let drivers = sqlx::query_as::<_, Driver>(
            r#"
            SELECT id, name, nik, phone_number, daily_cost_cents, deleted_at, created_at
            FROM drivers
            WHERE deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }
}
