//! # Referential Integrity Guard
//!
//! Counts the bookings that reference a customer, car or driver and refuses
//! deletions that would orphan or erase booking history.
//!
//! ## Deletion Policy
//! ```text
//! ┌──────────┬───────────────────┬────────────────────────┬──────────────┐
//! │ entity   │ active bookings   │ only finished bookings │ no bookings  │
//! ├──────────┼───────────────────┼────────────────────────┼──────────────┤
//! │ car      │ ✗ active_bookings │ soft delete            │ soft delete  │
//! │ driver   │ ✗ active_bookings │ soft delete            │ soft delete  │
//! │ customer │ ✗ active_bookings │ ✗ booking_history      │ hard delete  │
//! └──────────┴───────────────────┴────────────────────────┴──────────────┘
//! ```
//!
//! Both counts are taken inside the same transaction as the delete statement,
//! so no booking can appear between the check and the delete.

use chrono::Utc;
use tracing::{info, warn};

use rental_core::integrity::deletion_policy;
use rental_core::{ConstraintInfo, CoreError, DeletionAction, DeletionOutcome, EntityKind};
use rental_db::{Database, StoreTx};

use crate::error::{ServiceError, ServiceResult};

/// Guards deletion of entities referenced by bookings.
#[derive(Debug, Clone)]
pub struct IntegrityGuard {
    db: Database,
}

impl IntegrityGuard {
    pub fn new(db: Database) -> Self {
        IntegrityGuard { db }
    }

    /// Total and active bookings referencing an entity.
    ///
    /// An unknown id simply has no bookings.
    pub async fn check_constraints(
        &self,
        kind: EntityKind,
        entity_id: &str,
    ) -> ServiceResult<ConstraintInfo> {
        Ok(self.db.bookings().count_for(kind, entity_id).await?)
    }

    /// Soft-deletes a car without active bookings.
    pub async fn delete_car(&self, car_id: &str) -> ServiceResult<DeletionOutcome> {
        self.delete(EntityKind::Car, car_id).await
    }

    /// Soft-deletes a driver without active bookings.
    pub async fn delete_driver(&self, driver_id: &str) -> ServiceResult<DeletionOutcome> {
        self.delete(EntityKind::Driver, driver_id).await
    }

    /// Removes a customer who never booked.
    pub async fn delete_customer(&self, customer_id: &str) -> ServiceResult<DeletionOutcome> {
        self.delete(EntityKind::Customer, customer_id).await
    }

    async fn delete(&self, kind: EntityKind, entity_id: &str) -> ServiceResult<DeletionOutcome> {
        let mut tx = self.db.begin().await?;

        if !exists(&mut tx, kind, entity_id).await? {
            return Err(CoreError::not_found(entity_label(kind), entity_id).into());
        }

        let info = tx.count_bookings(kind, entity_id).await?;
        let action = deletion_policy(kind, entity_id, info).map_err(|violation| {
            warn!(
                entity = %kind,
                id = %entity_id,
                constraint = violation.constraint.as_str(),
                total_bookings = info.total_bookings,
                active_bookings = info.active_bookings,
                "Deletion refused"
            );
            ServiceError::from(violation)
        })?;

        let now = Utc::now();
        let deleted = match (kind, action) {
            (EntityKind::Car, DeletionAction::SoftDelete) => {
                tx.soft_delete_car(entity_id, now).await?
            }
            (EntityKind::Driver, DeletionAction::SoftDelete) => {
                tx.soft_delete_driver(entity_id, now).await?
            }
            (EntityKind::Customer, DeletionAction::HardDelete) => {
                tx.hard_delete_customer(entity_id).await?
            }
            (kind, action) => {
                return Err(ServiceError::internal(format!(
                    "No {:?} statement for {}",
                    action, kind
                )))
            }
        };

        if !deleted {
            return Err(CoreError::not_found(entity_label(kind), entity_id).into());
        }

        tx.commit().await?;

        info!(entity = %kind, id = %entity_id, action = ?action, "Entity deleted");

        Ok(DeletionOutcome {
            entity_type: kind,
            entity_id: entity_id.to_string(),
            action,
            deleted_at: (action == DeletionAction::SoftDelete).then_some(now),
        })
    }
}

async fn exists(tx: &mut StoreTx, kind: EntityKind, id: &str) -> ServiceResult<bool> {
    let found = match kind {
        EntityKind::Customer => tx.active_customer(id).await?.is_some(),
        EntityKind::Car => tx.active_car(id).await?.is_some(),
        EntityKind::Driver => tx.active_driver(id).await?.is_some(),
    };
    Ok(found)
}

fn entity_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Customer => "Customer",
        EntityKind::Car => "Car",
        EntityKind::Driver => "Driver",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
