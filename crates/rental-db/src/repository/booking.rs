//! # Booking Repository
//!
//! Database operations for bookings.
//!
//! ## Booking Lifecycle (store view)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Booking Rows                                      │
//! │                                                                         │
//! │  1. CREATE   insert()            + cars.stock - 1                      │
//! │  2. UPDATE   update_terms()      dates and costs only                  │
//! │  3. FINISH   mark_finished()     + cars.stock + 1 (+ incentive row)    │
//! │  4. DELETE   delete_unfinished() + cars.stock + 1                      │
//! │                                                                         │
//! │  Every write after creation carries `AND finished = 0`, so a finished  │
//! │  row cannot be changed again even by a racing request.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{booking_type, car, customer, driver, membership};
use rental_core::{Booking, BookingDetails, ConstraintInfo, CustomerDetails, EntityKind};

// =============================================================================
// Statements
// =============================================================================

pub(crate) async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        SELECT
            id, customer_id, car_id, booking_type_id, driver_id,
            start_rent, end_rent, finished,
            total_cost_cents, discount_cents, total_driver_cost_cents,
            created_at, updated_at
        FROM bookings
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(booking)
}

pub(crate) async fn fetch_all(conn: &mut SqliteConnection) -> DbResult<Vec<Booking>> {
    let bookings = sqlx::query_as::<_, Booking>(
        r#"
        SELECT
            id, customer_id, car_id, booking_type_id, driver_id,
            start_rent, end_rent, finished,
            total_cost_cents, discount_cents, total_driver_cost_cents,
            created_at, updated_at
        FROM bookings
        ORDER BY created_at, rowid
        "#,
    )
    .fetch_all(conn)
    .await?;

    Ok(bookings)
}

pub(crate) async fn insert(conn: &mut SqliteConnection, booking: &Booking) -> DbResult<()> {
    debug!(id = %booking.id, car_id = %booking.car_id, "Inserting booking");

    sqlx::query(
        r#"
        INSERT INTO bookings (
            id, customer_id, car_id, booking_type_id, driver_id,
            start_rent, end_rent, finished,
            total_cost_cents, discount_cents, total_driver_cost_cents,
            created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8,
            ?9, ?10, ?11,
            ?12, ?13
        )
        "#,
    )
    .bind(&booking.id)
    .bind(&booking.customer_id)
    .bind(&booking.car_id)
    .bind(&booking.booking_type_id)
    .bind(&booking.driver_id)
    .bind(booking.start_rent)
    .bind(booking.end_rent)
    .bind(booking.finished)
    .bind(booking.total_cost_cents)
    .bind(booking.discount_cents)
    .bind(booking.total_driver_cost_cents)
    .bind(booking.created_at)
    .bind(booking.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Writes the patchable columns (dates, costs) of an unfinished booking.
/// Returns rows affected.
pub(crate) async fn update_terms(conn: &mut SqliteConnection, booking: &Booking) -> DbResult<u64> {
    debug!(id = %booking.id, "Updating booking terms");

    let result = sqlx::query(
        r#"
        UPDATE bookings SET
            start_rent = ?2,
            end_rent = ?3,
            total_cost_cents = ?4,
            discount_cents = ?5,
            total_driver_cost_cents = ?6,
            updated_at = ?7
        WHERE id = ?1 AND finished = 0
        "#,
    )
    .bind(&booking.id)
    .bind(booking.start_rent)
    .bind(booking.end_rent)
    .bind(booking.total_cost_cents)
    .bind(booking.discount_cents)
    .bind(booking.total_driver_cost_cents)
    .bind(booking.updated_at)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Flags an unfinished booking as finished. Returns rows affected.
pub(crate) async fn mark_finished(
    conn: &mut SqliteConnection,
    id: &str,
    at: DateTime<Utc>,
) -> DbResult<u64> {
    debug!(id = %id, "Marking booking finished");

    let result =
        sqlx::query("UPDATE bookings SET finished = 1, updated_at = ?2 WHERE id = ?1 AND finished = 0")
            .bind(id)
            .bind(at)
            .execute(conn)
            .await?;

    Ok(result.rows_affected())
}

/// Removes an unfinished booking. Returns rows affected.
pub(crate) async fn delete_unfinished(conn: &mut SqliteConnection, id: &str) -> DbResult<u64> {
    debug!(id = %id, "Deleting booking");

    let result = sqlx::query("DELETE FROM bookings WHERE id = ?1 AND finished = 0")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

/// Counts all and unfinished bookings referencing one entity.
pub(crate) async fn count_for(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    id: &str,
) -> DbResult<ConstraintInfo> {
    // Column name comes from a closed enum, never from input.
    let sql = format!(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(CASE WHEN finished = 0 THEN 1 ELSE 0 END), 0)
        FROM bookings
        WHERE {} = ?1
        "#,
        kind.booking_foreign_key()
    );

    let (total_bookings, active_bookings): (i64, i64) = sqlx::query_as(&sql)
        .bind(id)
        .fetch_one(conn)
        .await?;

    debug!(
        entity = %kind,
        id = %id,
        total_bookings,
        active_bookings,
        "Counted referencing bookings"
    );

    Ok(ConstraintInfo {
        total_bookings,
        active_bookings,
    })
}

/// Joins a booking with everything it references.
///
/// Soft-deleted customers, cars and drivers are included.
pub(crate) async fn load_details(
    conn: &mut SqliteConnection,
    booking: Booking,
) -> DbResult<BookingDetails> {
    let customer = customer::fetch_any(conn, &booking.customer_id)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", &booking.customer_id))?;

    let membership = match customer.membership_id.as_deref() {
        Some(membership_id) => membership::fetch(conn, membership_id).await?,
        None => None,
    };

    let car = car::fetch_any(conn, &booking.car_id)
        .await?
        .ok_or_else(|| DbError::not_found("Car", &booking.car_id))?;

    let driver = match booking.driver_id.as_deref() {
        Some(driver_id) => Some(
            driver::fetch_any(conn, driver_id)
                .await?
                .ok_or_else(|| DbError::not_found("Driver", driver_id))?,
        ),
        None => None,
    };

    let booking_type = booking_type::fetch(conn, &booking.booking_type_id)
        .await?
        .ok_or_else(|| DbError::not_found("BookingType", &booking.booking_type_id))?;

    Ok(BookingDetails {
        booking,
        customer: CustomerDetails {
            customer,
            membership,
        },
        car,
        driver,
        booking_type,
    })
}

// =============================================================================
// Repository
// =============================================================================

/// Read access to bookings outside a transaction.
///
/// Writes go through [`crate::StoreTx`] so that the stock change lands in the
/// same transaction.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingRepository { pool }
    }

    /// Gets a booking by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Booking>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    /// Gets a booking joined with its references.
    pub async fn get_details(&self, id: &str) -> DbResult<Option<BookingDetails>> {
        let mut conn = self.pool.acquire().await?;
        match fetch(&mut conn, id).await? {
            Some(booking) => Ok(Some(load_details(&mut conn, booking).await?)),
            None => Ok(None),
        }
    }

    /// Lists every booking joined with its references, oldest first.
    pub async fn list_details(&self) -> DbResult<Vec<BookingDetails>> {
        let mut conn = self.pool.acquire().await?;
        let bookings = fetch_all(&mut conn).await?;

        let mut details = Vec::with_capacity(bookings.len());
        for booking in bookings {
            details.push(load_details(&mut conn, booking).await?);
        }

        debug!(count = details.len(), "Listed bookings");
        Ok(details)
    }

    /// Counts bookings referencing an entity.
    pub async fn count_for(&self, kind: EntityKind, id: &str) -> DbResult<ConstraintInfo> {
        let mut conn = self.pool.acquire().await?;
        count_for(&mut conn, kind, id).await
    }
}
