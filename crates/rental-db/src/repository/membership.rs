//! # Membership Repository
//!
//! Membership plans and their discount rates.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use rental_core::{DiscountRate, Membership};

// =============================================================================
// Statements
// =============================================================================

pub(crate) async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Membership>> {
    let membership = sqlx::query_as::<_, Membership>(
        r#"
        SELECT id, name, discount_bps, created_at
        FROM memberships
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(membership)
}

pub(crate) async fn fetch_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> DbResult<Option<Membership>> {
    let membership = sqlx::query_as::<_, Membership>(
        r#"
        SELECT id, name, discount_bps, created_at
        FROM memberships
        WHERE name = ?1
        "#,
    )
    .bind(name)
    .fetch_optional(conn)
    .await?;

    Ok(membership)
}

pub(crate) async fn insert(conn: &mut SqliteConnection, membership: &Membership) -> DbResult<()> {
    debug!(name = %membership.name, discount_bps = membership.discount_bps, "Inserting membership");

    sqlx::query(
        r#"
        INSERT INTO memberships (id, name, discount_bps, created_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&membership.id)
    .bind(&membership.name)
    .bind(membership.discount_bps)
    .bind(membership.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for membership plans.
#[derive(Debug, Clone)]
pub struct MembershipRepository {
    pool: SqlitePool,
}

impl MembershipRepository {
    /// Creates a new MembershipRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MembershipRepository { pool }
    }

    /// Gets a membership by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Membership>> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    /// Gets a membership by its unique name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Membership>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_name(&mut conn, name).await
    }

    /// Creates a membership plan.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - name already taken
    pub async fn create(&self, name: &str, discount: DiscountRate) -> DbResult<Membership> {
        let membership = Membership {
            id: generate_id(),
            name: name.trim().to_string(),
            discount_bps: discount.bps(),
            created_at: Utc::now(),
        };

        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, &membership).await.map_err(|e| match e {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &membership.name),
            other => other,
        })?;

        Ok(membership)
    }

    /// Lists all memberships, smallest discount first.
    pub async fn list(&self) -> DbResult<Vec<Membership>> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, name, discount_bps, created_at
            FROM memberships
            ORDER BY discount_bps, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(memberships)
    }
}
