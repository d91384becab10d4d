//! # Default Data
//!
//! Reference rows every installation needs: the membership plans and the two
//! booking types.
//!
//! ## Defaults
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  memberships                      booking_types                        │
//! │  ─────────────────────            ─────────────────────────────────    │
//! │  Bronze    4%                     Car Only      "Rent Car only"        │
//! │  Silver    7%                     Car & Driver  "Rent Car and a Driver"│
//! │  Gold     15%                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are matched by name/label, so seeding twice inserts nothing new.

use chrono::Utc;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::generate_id;
use rental_core::{
    BookingType, DiscountRate, Membership, BOOKING_TYPE_CAR_AND_DRIVER, BOOKING_TYPE_CAR_ONLY,
};

/// Membership plans as `(name, discount percent)`.
pub const DEFAULT_MEMBERSHIPS: &[(&str, u32)] = &[("Bronze", 4), ("Silver", 7), ("Gold", 15)];

/// Booking types as `(label, description)`.
pub const DEFAULT_BOOKING_TYPES: &[(&str, &str)] = &[
    (BOOKING_TYPE_CAR_ONLY, "Rent Car only"),
    (BOOKING_TYPE_CAR_AND_DRIVER, "Rent Car and a Driver"),
];

/// How many rows a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub memberships: usize,
    pub booking_types: usize,
}

/// Inserts the missing default memberships and booking types in one
/// transaction.
pub async fn seed_defaults(db: &Database) -> DbResult<SeedReport> {
    let mut report = SeedReport::default();
    let mut tx = db.begin().await?;

    for (name, percent) in DEFAULT_MEMBERSHIPS {
        if tx.membership_by_name(name).await?.is_some() {
            debug!(name = %name, "Membership already present");
            continue;
        }

        tx.insert_membership(&Membership {
            id: generate_id(),
            name: (*name).to_string(),
            discount_bps: DiscountRate::from_percent(*percent).bps(),
            created_at: Utc::now(),
        })
        .await?;
        report.memberships += 1;
    }

    for (label, description) in DEFAULT_BOOKING_TYPES {
        if tx.booking_type_by_label(label).await?.is_some() {
            debug!(label = %label, "Booking type already present");
            continue;
        }

        tx.insert_booking_type(&BookingType {
            id: generate_id(),
            label: (*label).to_string(),
            description: (*description).to_string(),
        })
        .await?;
        report.booking_types += 1;
    }

    tx.commit().await?;

    info!(
        memberships = report.memberships,
        booking_types = report.booking_types,
        "Default data seeded"
    );
    Ok(report)
}
