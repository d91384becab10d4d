//! # Customer Repository
//!
//! Database operations for customers.
//!
//! Customers are never soft-deleted by the rental flows: a customer without
//! any booking is removed outright, one with history is kept. `deleted_at` is
//! still honored by lookups so rows archived by other means stay hidden.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::generate_id;
use rental_core::{Customer, NewCustomer};

// =============================================================================
// Statements
// =============================================================================

/// Looks up a customer that has not been deleted.
pub(crate) async fn fetch_active(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, name, nik, phone_number, membership_id, deleted_at, created_at
        FROM customers
        WHERE id = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(customer)
}

/// Looks up a customer regardless of deletion, for historical joins.
pub(crate) async fn fetch_any(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, name, nik, phone_number, membership_id, deleted_at, created_at
        FROM customers
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(customer)
}

pub(crate) async fn insert(conn: &mut SqliteConnection, customer: &Customer) -> DbResult<()> {
    debug!(id = %customer.id, "Inserting customer");

    sqlx::query(
        r#"
        INSERT INTO customers (id, name, nik, phone_number, membership_id, deleted_at, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&customer.id)
    .bind(&customer.name)
    .bind(&customer.nik)
    .bind(&customer.phone_number)
    .bind(&customer.membership_id)
    .bind(customer.deleted_at)
    .bind(customer.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Sets or clears the membership reference. Returns rows affected.
pub(crate) async fn set_membership(
    conn: &mut SqliteConnection,
    id: &str,
    membership_id: Option<&str>,
) -> DbResult<u64> {
    debug!(id = %id, membership_id = ?membership_id, "Updating customer membership");

    let result = sqlx::query(
        r#"
        UPDATE customers
        SET membership_id = ?2
        WHERE id = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(membership_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Removes the row. Returns rows affected.
pub(crate) async fn hard_delete(conn: &mut SqliteConnection, id: &str) -> DbResult<u64> {
    debug!(id = %id, "Hard-deleting customer");

    let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID, excluding deleted ones.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let mut conn = self.pool.acquire().await?;
        fetch_active(&mut conn, id).await
    }

    /// Inserts a customer. Input is expected to be validated already.
    pub async fn create(&self, input: &NewCustomer) -> DbResult<Customer> {
        let customer = Customer {
            id: generate_id(),
            name: input.name.trim().to_string(),
            nik: input.nik.trim().to_string(),
            phone_number: input.phone_number.trim().to_string(),
            membership_id: input.membership_id.clone(),
            deleted_at: None,
            created_at: Utc::now(),
        };

        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, &customer).await?;

        Ok(customer)
    }

    /// Lists customers that have not been deleted, by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, nik, phone_number, membership_id, deleted_at, created_at
            FROM customers
            WHERE deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Counts customers that have not been deleted.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
