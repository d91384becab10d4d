//! # Sparse Patches
//!
//! Partial updates where "field omitted" and "field set" are distinct.
//!
//! ## Wire Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  { "end_rent": "2024-01-14" }                                           │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  BookingPatch {                                                         │
//! │      start_rent:              Keep                                      │
//! │      end_rent:                Set(2024-01-14)                           │
//! │      total_cost_cents:        Keep                                      │
//! │      discount_cents:          Keep                                      │
//! │      total_driver_cost_cents: Keep                                      │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Absent keys deserialize to [`Patch::Keep`]. `finished` is not a patch
//! field: only the finish operation sets it.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::Booking;
use crate::validation::{validate_non_negative_cents, ValidationResult};

// =============================================================================
// Patch
// =============================================================================

/// One optional field of a partial update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Leave the stored value untouched.
    #[default]
    Keep,
    /// Replace the stored value.
    Set(T),
}

impl<T> Patch<T> {
    #[inline]
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Keep => None,
        }
    }

    /// Overwrites `target` when set.
    pub fn apply(self, target: &mut T) {
        if let Patch::Set(value) = self {
            *target = value;
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Keep,
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Set(value) => value.serialize(serializer),
            Patch::Keep => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Patch::Set)
    }
}

// =============================================================================
// Booking Patch
// =============================================================================

/// Partial update of a booking.
///
/// Cost fields supplied here are only kept when neither date changes; a date
/// change recomputes all three costs from the merged period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPatch {
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub start_rent: Patch<NaiveDate>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub end_rent: Patch<NaiveDate>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub total_cost_cents: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub discount_cents: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub total_driver_cost_cents: Patch<i64>,
}

impl BookingPatch {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.start_rent.is_keep()
            && self.end_rent.is_keep()
            && self.total_cost_cents.is_keep()
            && self.discount_cents.is_keep()
            && self.total_driver_cost_cents.is_keep()
    }

    /// True when either rental date is set.
    pub fn touches_dates(&self) -> bool {
        self.start_rent.is_set() || self.end_rent.is_set()
    }

    /// Rejects negative amounts among the set cost fields.
    pub fn validate(&self) -> ValidationResult<()> {
        let costs = [
            ("total_cost", &self.total_cost_cents),
            ("discount", &self.discount_cents),
            ("total_driver_cost", &self.total_driver_cost_cents),
        ];
        for (field, patch) in costs {
            if let Some(cents) = patch.as_set() {
                validate_non_negative_cents(field, *cents)?;
            }
        }
        Ok(())
    }

    /// Rental dates after merging this patch over `booking`.
    pub fn merged_dates(&self, booking: &Booking) -> (NaiveDate, NaiveDate) {
        (
            self.start_rent.as_set().copied().unwrap_or(booking.start_rent),
            self.end_rent.as_set().copied().unwrap_or(booking.end_rent),
        )
    }

    /// Merges the set fields into `booking`.
    pub fn apply_to(&self, booking: &mut Booking) {
        self.start_rent.apply(&mut booking.start_rent);
        self.end_rent.apply(&mut booking.end_rent);
        self.total_cost_cents.apply(&mut booking.total_cost_cents);
        self.discount_cents.apply(&mut booking.discount_cents);
        self.total_driver_cost_cents
            .apply(&mut booking.total_driver_cost_cents);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
