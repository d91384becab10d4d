//! # Booking Type Repository
//!
//! The two booking types ("Car Only", "Car & Driver") are reference data,
//! inserted by the seeder and never deleted.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::generate_id;
use rental_core::BookingType;

pub(crate) async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<BookingType>> {
    let booking_type = sqlx::query_as::<_, BookingType>(
        "SELECT id, label, description FROM booking_types WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(booking_type)
}

pub(crate) async fn fetch_by_label(
    conn: &mut SqliteConnection,
    label: &str,
) -> DbResult<Option<BookingType>> {
    let booking_type = sqlx::query_as::<_, BookingType>(
        "SELECT id, label, description FROM booking_types WHERE label = ?1",
    )
    .bind(label)
    .fetch_optional(conn)
    .await?;

    Ok(booking_type)
}

pub(crate) async fn insert(conn: &mut SqliteConnection, booking_type: &BookingType) -> DbResult<()> {
    debug!(label = %booking_type.label, "Inserting booking type");

    sqlx::query("INSERT INTO booking_types (id, label, description) VALUES (?1, ?2, ?3)")
        .bind(&booking_type.id)
        .bind(&booking_type.label)
        .bind(&booking_type.description)
        .execute(conn)
        .await?;

    Ok(())
}

/// Repository for booking types.
#[derive(Debug, Clone)]
pub struct BookingTypeRepository {
    pool: SqlitePool,
}

impl BookingTypeRepository {
    /// Creates a new BookingTypeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookingTypeRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<BookingType>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    /// Gets a booking type by label, e.g. [`rental_core::BOOKING_TYPE_CAR_ONLY`].
    pub async fn get_by_label(&self, label: &str) -> DbResult<Option<BookingType>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_label(&mut conn, label).await
    }

    pub async fn create(&self, label: &str, description: &str) -> DbResult<BookingType> {
        let booking_type = BookingType {
            id: generate_id(),
            label: label.to_string(),
            description: description.to_string(),
        };

        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, &booking_type).await?;

        Ok(booking_type)
    }

    pub async fn list(&self) -> DbResult<Vec<BookingType>> {
        let types = sqlx::query_as::<_, BookingType>(
            "SELECT id, label, description FROM booking_types ORDER BY label",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }
}
