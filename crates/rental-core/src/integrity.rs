//! # Referential Integrity Policy
//!
//! Decides whether a customer, car or driver may be deleted, given how many
//! bookings still reference it.
//!
//! ## Deletion Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Entity     active > 0          only finished           none           │
//! │  ────────   ─────────────────   ─────────────────────   ────────────   │
//! │  Car        ✗ active_bookings   soft delete             soft delete    │
//! │  Driver     ✗ active_bookings   soft delete             soft delete    │
//! │  Customer   ✗ active_bookings   ✗ booking_history       hard delete    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The storage layer has no cascading deletes, so both counts are taken and
//! this policy is evaluated before any destructive statement runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Entity Kind
// =============================================================================

/// Entities guarded against deletion while bookings reference them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Customer,
    Car,
    Driver,
}

impl EntityKind {
    /// Lowercase name used in messages and structured errors.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Car => "car",
            EntityKind::Driver => "driver",
        }
    }

    /// The `bookings` column referencing this entity.
    pub const fn booking_foreign_key(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer_id",
            EntityKind::Car => "car_id",
            EntityKind::Driver => "driver_id",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Constraint Info
// =============================================================================

/// Booking counts for one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConstraintInfo {
    pub total_bookings: i64,
    /// Bookings with `finished == false`.
    pub active_bookings: i64,
}

impl ConstraintInfo {
    #[inline]
    pub fn has_bookings(&self) -> bool {
        self.total_bookings > 0
    }

    #[inline]
    pub fn has_active(&self) -> bool {
        self.active_bookings > 0
    }
}

// =============================================================================
// Constraint Violation
// =============================================================================

/// Which rule refused the deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Unfinished bookings still reference the entity.
    ActiveBookings,
    /// Only finished bookings remain, but customers keep their history.
    BookingHistory,
    /// The booking itself is finished and kept for history.
    FinishedBooking,
}

impl ConstraintKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::ActiveBookings => "active_bookings",
            ConstraintKind::BookingHistory => "booking_history",
            ConstraintKind::FinishedBooking => "finished_booking",
        }
    }
}

/// Structured reason a deletion was refused.
///
/// ## Serialization
/// ```json
/// {
///   "entity_type": "car",
///   "entity_id": "2f0c…",
///   "constraint": "active_bookings",
///   "total_bookings": 3,
///   "active_bookings": 1
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConstraintViolation {
    pub entity_type: String,
    pub entity_id: String,
    pub constraint: ConstraintKind,
    pub total_bookings: i64,
    pub active_bookings: i64,
}

impl ConstraintViolation {
    /// Builds a violation for a guarded entity.
    pub fn new(
        kind: EntityKind,
        entity_id: impl Into<String>,
        constraint: ConstraintKind,
        info: ConstraintInfo,
    ) -> Self {
        ConstraintViolation {
            entity_type: kind.as_str().to_string(),
            entity_id: entity_id.into(),
            constraint,
            total_bookings: info.total_bookings,
            active_bookings: info.active_bookings,
        }
    }

    /// Violation raised when deleting a finished booking.
    pub fn finished_booking(booking_id: impl Into<String>) -> Self {
        ConstraintViolation {
            entity_type: "booking".to_string(),
            entity_id: booking_id.into(),
            constraint: ConstraintKind::FinishedBooking,
            total_bookings: 1,
            active_bookings: 0,
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constraint {
            ConstraintKind::ActiveBookings => write!(
                f,
                "Cannot delete {} with active bookings ({} active of {}). Please finish or cancel active bookings first.",
                self.entity_type, self.active_bookings, self.total_bookings
            ),
            ConstraintKind::BookingHistory => write!(
                f,
                "Cannot delete {} with booking history ({} finished bookings). Records with past bookings are kept for history.",
                self.entity_type, self.total_bookings
            ),
            ConstraintKind::FinishedBooking => f.write_str(
                "Cannot delete finished booking. Finished bookings are kept for historical records.",
            ),
        }
    }
}

// =============================================================================
// Deletion Policy
// =============================================================================

/// What a permitted deletion does to the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeletionAction {
    /// Set `deleted_at`; the row stays for historical joins.
    SoftDelete,
    /// Remove the row.
    HardDelete,
}

/// Result of a permitted deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeletionOutcome {
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub action: DeletionAction,
    /// Set for soft deletes.
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Applies the deletion policy to the booking counts of one entity.
///
/// ## Example
/// ```rust
/// use rental_core::integrity::{deletion_policy, ConstraintInfo, DeletionAction, EntityKind};
///
/// let only_finished = ConstraintInfo { total_bookings: 2, active_bookings: 0 };
/// assert_eq!(
///     deletion_policy(EntityKind::Driver, "d-1", only_finished).unwrap(),
///     DeletionAction::SoftDelete,
/// );
/// assert!(deletion_policy(EntityKind::Customer, "c-1", only_finished).is_err());
/// ```
pub fn deletion_policy(
    kind: EntityKind,
    entity_id: &str,
    info: ConstraintInfo,
) -> Result<DeletionAction, ConstraintViolation> {
    if info.has_active() {
        return Err(ConstraintViolation::new(
            kind,
            entity_id,
            ConstraintKind::ActiveBookings,
            info,
        ));
    }

    match kind {
        EntityKind::Car | EntityKind::Driver => Ok(DeletionAction::SoftDelete),
        EntityKind::Customer if info.has_bookings() => Err(ConstraintViolation::new(
            kind,
            entity_id,
            ConstraintKind::BookingHistory,
            info,
        )),
        EntityKind::Customer => Ok(DeletionAction::HardDelete),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: ConstraintInfo = ConstraintInfo {
        total_bookings: 0,
        active_bookings: 0,
    };
    const FINISHED_ONLY: ConstraintInfo = ConstraintInfo {
        total_bookings: 2,
        active_bookings: 0,
    };
    const ONE_ACTIVE: ConstraintInfo = ConstraintInfo {
        total_bookings: 3,
        active_bookings: 1,
    };

    #[test]
    fn test_car_and_driver_soft_delete_without_active() {
        for kind in [EntityKind::Car, EntityKind::Driver] {
            assert_eq!(deletion_policy(kind, "x", NONE).unwrap(), DeletionAction::SoftDelete);
            assert_eq!(
                deletion_policy(kind, "x", FINISHED_ONLY).unwrap(),
                DeletionAction::SoftDelete
            );
        }
    }

    #[test]
    fn test_active_bookings_block_every_kind() {
        for kind in [EntityKind::Car, EntityKind::Driver, EntityKind::Customer] {
            let violation = deletion_policy(kind, "x", ONE_ACTIVE).unwrap_err();
            assert_eq!(violation.constraint, ConstraintKind::ActiveBookings);
            assert_eq!(violation.entity_type, kind.as_str());
            assert_eq!(violation.active_bookings, 1);
            assert_eq!(violation.total_bookings, 3);
        }
    }

    #[test]
    fn test_customer_with_history_is_kept() {
        let violation = deletion_policy(EntityKind::Customer, "c-1", FINISHED_ONLY).unwrap_err();
        assert_eq!(violation.constraint, ConstraintKind::BookingHistory);
        assert_eq!(violation.entity_id, "c-1");
    }

    #[test]
    fn test_customer_without_bookings_is_hard_deleted() {
        assert_eq!(
            deletion_policy(EntityKind::Customer, "c-1", NONE).unwrap(),
            DeletionAction::HardDelete
        );
    }

    #[test]
    fn test_violation_serializes_constraint_name() {
        let violation =
            ConstraintViolation::new(EntityKind::Car, "car-1", ConstraintKind::ActiveBookings, ONE_ACTIVE);
        let json = serde_json::to_value(&violation).unwrap();

        assert_eq!(json["entity_type"], "car");
        assert_eq!(json["constraint"], "active_bookings");
        assert_eq!(json["active_bookings"], 1);
        assert_eq!(ConstraintKind::BookingHistory.as_str(), "booking_history");
    }

    #[test]
    fn test_foreign_keys() {
        assert_eq!(EntityKind::Customer.booking_foreign_key(), "customer_id");
        assert_eq!(EntityKind::Car.booking_foreign_key(), "car_id");
        assert_eq!(EntityKind::Driver.booking_foreign_key(), "driver_id");
    }
}
