//! # Car Repository
//!
//! Database operations for cars.
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Guarded Stock Statements                             │
//! │                                                                         │
//! │  reserve_unit:  UPDATE cars SET stock = stock - 1                      │
//! │                 WHERE id = ? AND stock > 0 AND deleted_at IS NULL      │
//! │                 → 0 rows: nothing left to book                         │
//! │                                                                         │
//! │  release_unit:  UPDATE cars SET stock = stock + 1                      │
//! │                 WHERE id = ? RETURNING stock                           │
//! │                                                                         │
//! │  Both run inside the caller's BEGIN IMMEDIATE transaction, so two      │
//! │  bookings can never both take the last unit.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::generate_id;
use rental_core::{Car, NewCar};

// =============================================================================
// Statements
// =============================================================================

/// Looks up a car that has not been soft-deleted.
pub(crate) async fn fetch_active(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Car>> {
    let car = sqlx::query_as::<_, Car>(
        r#"
        SELECT id, name, stock, daily_rent_cents, deleted_at, created_at
        FROM cars
        WHERE id = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(car)
}

/// Looks up a car regardless of soft deletion, for historical joins.
pub(crate) async fn fetch_any(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Car>> {
    let car = sqlx::query_as::<_, Car>(
        r#"
        SELECT id, name, stock, daily_rent_cents, deleted_at, created_at
        FROM cars
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(car)
}

pub(crate) async fn insert(conn: &mut SqliteConnection, car: &Car) -> DbResult<()> {
    debug!(id = %car.id, stock = car.stock, "Inserting car");

    sqlx::query(
        r#"
        INSERT INTO cars (id, name, stock, daily_rent_cents, deleted_at, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&car.id)
    .bind(&car.name)
    .bind(car.stock)
    .bind(car.daily_rent_cents)
    .bind(car.deleted_at)
    .bind(car.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Takes one unit. Returns the remaining stock, or `None` when no unit was
/// available.
pub(crate) async fn reserve_unit(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<i64>> {
    debug!(car_id = %id, "Reserving car unit");

    let remaining: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE cars
        SET stock = stock - 1
        WHERE id = ?1 AND stock > 0 AND deleted_at IS NULL
        RETURNING stock
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(remaining)
}

/// Gives one unit back. Returns the new stock, or `None` if the car row is
/// missing.
pub(crate) async fn release_unit(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<i64>> {
    debug!(car_id = %id, "Releasing car unit");

    let stock: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE cars
        SET stock = stock + 1
        WHERE id = ?1
        RETURNING stock
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(stock)
}

/// Sets `deleted_at`. Returns rows affected.
pub(crate) async fn soft_delete(
    conn: &mut SqliteConnection,
    id: &str,
    at: DateTime<Utc>,
) -> DbResult<u64> {
    debug!(car_id = %id, "Soft-deleting car");

    let result = sqlx::query("UPDATE cars SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL")
        .bind(id)
        .bind(at)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for car database operations.
#[derive(Debug, Clone)]
pub struct CarRepository {
    pool: SqlitePool,
}

impl CarRepository {
    /// Creates a new CarRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CarRepository { pool }
    }

    /// Gets a car by ID, excluding soft-deleted ones.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Car>> {
        let mut conn = self.pool.acquire().await?;
        fetch_active(&mut conn, id).await
    }

    /// Gets a car by ID, including soft-deleted ones.
    pub async fn get_any(&self, id: &str) -> DbResult<Option<Car>> {
        let mut conn = self.pool.acquire().await?;
        fetch_any(&mut conn, id).await
    }

    /// Inserts a car. Input is expected to be validated already.
    pub async fn create(&self, input: &NewCar) -> DbResult<Car> {
        let car = Car {
            id: generate_id(),
            name: input.name.trim().to_string(),
            stock: input.stock,
            daily_rent_cents: input.daily_rent_cents,
            deleted_at: None,
            created_at: Utc::now(),
        };

        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, &car).await?;

        Ok(car)
    }

    /// Lists cars that have not been soft-deleted, by name.
    pub async fn list(&self) -> DbResult<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(
            r#"
            SELECT id, name, stock, daily_rent_cents, deleted_at, created_at
            FROM cars
            WHERE deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(cars)
    }

    /// Counts cars that have not been soft-deleted.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
