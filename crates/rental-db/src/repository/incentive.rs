//! # Driver Incentive Repository
//!
//! Incentive rows are written when a booking with a driver is finished and
//! are read back per driver through the booking they belong to.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use rental_core::DriverIncentive;

pub(crate) async fn insert(conn: &mut SqliteConnection, incentive: &DriverIncentive) -> DbResult<()> {
    debug!(
        booking_id = %incentive.booking_id,
        incentive_cents = incentive.incentive_cents,
        "Inserting driver incentive"
    );

    sqlx::query(
        r#"
        INSERT INTO driver_incentives (id, booking_id, incentive_cents, deleted_at, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&incentive.id)
    .bind(&incentive.booking_id)
    .bind(incentive.incentive_cents)
    .bind(incentive.deleted_at)
    .bind(incentive.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Lists live incentives of every booking driven by `driver_id`, oldest first.
pub(crate) async fn fetch_for_driver(
    conn: &mut SqliteConnection,
    driver_id: &str,
) -> DbResult<Vec<DriverIncentive>> {
    let incentives = sqlx::query_as::<_, DriverIncentive>(
        r#"
        SELECT i.id, i.booking_id, i.incentive_cents, i.deleted_at, i.created_at
        FROM driver_incentives i
        INNER JOIN bookings b ON b.id = i.booking_id
        WHERE b.driver_id = ?1 AND i.deleted_at IS NULL
        ORDER BY i.created_at, i.rowid
        "#,
    )
    .bind(driver_id)
    .fetch_all(conn)
    .await?;

    Ok(incentives)
}

/// Repository for driver incentives.
#[derive(Debug, Clone)]
pub struct IncentiveRepository {
    pool: SqlitePool,
}

impl IncentiveRepository {
    /// Creates a new IncentiveRepository.
    pub fn new(pool: SqlitePool) -> Self {
        IncentiveRepository { pool }
    }

    pub async fn list_for_driver(&self, driver_id: &str) -> DbResult<Vec<DriverIncentive>> {
        let mut conn = self.pool.acquire().await?;
        fetch_for_driver(&mut conn, driver_id).await
    }

    /// Gets the incentive written for a booking, if any.
    pub async fn get_for_booking(&self, booking_id: &str) -> DbResult<Option<DriverIncentive>> {
        let incentive = sqlx::query_as::<_, DriverIncentive>(
            r#"
            SELECT id, booking_id, incentive_cents, deleted_at, created_at
            FROM driver_incentives
            WHERE booking_id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(incentive)
    }
}
