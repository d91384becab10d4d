//! # Domain Types
//!
//! Core domain types used throughout the rental system.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │       Car       │   │     Driver      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  nik            │   │  stock          │   │  daily_cost     │       │
//! │  │  membership_id? │   │  daily_rent     │   │  deleted_at?    │       │
//! │  └────────┬────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │           │                     │                     │                 │
//! │           └──────────┬──────────┴──────────┬──────────┘                 │
//! │                      ▼                     ▼                            │
//! │             ┌─────────────────┐   ┌─────────────────┐                  │
//! │             │     Booking     │◄──│ DriverIncentive │                  │
//! │             │  ─────────────  │   │  ─────────────  │                  │
//! │             │  start/end_rent │   │  booking_id     │                  │
//! │             │  finished       │   │  incentive      │                  │
//! │             │  total_cost     │   └─────────────────┘                  │
//! │             └─────────────────┘                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Foreign relationships are stored as ids and resolved by lookup; no entity
//! embeds another by value except the read-only `*Details` views.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::{DiscountRate, Money};
use crate::pricing::RentalPeriod;
use crate::BOOKING_TYPE_CAR_AND_DRIVER;

// =============================================================================
// Membership
// =============================================================================

/// A membership plan granting a percentage discount on the base rental cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Membership {
    pub id: String,
    pub name: String,
    /// Discount in basis points (1500 = 15%).
    pub discount_bps: u32,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// Returns the discount as a rate.
    #[inline]
    pub fn discount_rate(&self) -> DiscountRate {
        DiscountRate::from_bps(self.discount_bps)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer who rents cars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// National identity number (16 characters).
    pub nik: String,
    pub phone_number: String,
    /// Nullable foreign reference, changed only by subscribe/unsubscribe.
    pub membership_id: Option<String>,
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Car
// =============================================================================

/// A car model available for rent.
///
/// `stock` counts the units currently available. It is only changed by the
/// booking lifecycle: one unit per unfinished booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Car {
    pub id: String,
    pub name: String,
    pub stock: i64,
    /// Daily rental rate in cents.
    pub daily_rent_cents: i64,
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Car {
    /// Returns the daily rent as Money.
    #[inline]
    pub fn daily_rent(&self) -> Money {
        Money::from_cents(self.daily_rent_cents)
    }

    /// Checks if at least one unit can be booked.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.stock > 0 && self.deleted_at.is_none()
    }
}

// =============================================================================
// Driver
// =============================================================================

/// A driver who can be hired together with a car.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub nik: String,
    pub phone_number: String,
    /// Daily cost in cents.
    pub daily_cost_cents: i64,
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Driver {
    /// Returns the daily cost as Money.
    #[inline]
    pub fn daily_cost(&self) -> Money {
        Money::from_cents(self.daily_cost_cents)
    }
}

// =============================================================================
// Booking Type
// =============================================================================

/// Discriminator deciding whether a driver may (and must) be attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BookingType {
    pub id: String,
    /// "Car Only" or "Car & Driver".
    pub label: String,
    pub description: String,
}

impl BookingType {
    /// True for the "Car & Driver" type.
    #[inline]
    pub fn requires_driver(&self) -> bool {
        self.label == BOOKING_TYPE_CAR_AND_DRIVER
    }
}

// =============================================================================
// Booking
// =============================================================================

/// A rental of one car unit for an inclusive range of calendar days.
///
/// ## Invariants
/// - `driver_id.is_some()` iff the booking type is "Car & Driver"
/// - `start_rent <= end_rent`
/// - once `finished`, the row is never updated or deleted again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub car_id: String,
    pub booking_type_id: String,
    pub driver_id: Option<String>,
    #[ts(as = "String")]
    pub start_rent: NaiveDate,
    #[ts(as = "String")]
    pub end_rent: NaiveDate,
    pub finished: bool,
    /// Base cost: days × daily rent.
    pub total_cost_cents: i64,
    /// Membership discount on the base cost.
    pub discount_cents: i64,
    /// days × driver daily cost, zero without a driver.
    pub total_driver_cost_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Returns the stored rental period.
    pub fn period(&self) -> CoreResult<RentalPeriod> {
        Ok(RentalPeriod::new(self.start_rent, self.end_rent)?)
    }

    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn total_driver_cost(&self) -> Money {
        Money::from_cents(self.total_driver_cost_cents)
    }

    /// A booking is active until it has been finished.
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.finished
    }
}

/// Input for creating a booking.
///
/// Costs are never taken from the caller; they are computed on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewBooking {
    pub customer_id: String,
    pub car_id: String,
    pub booking_type_id: String,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[ts(as = "String")]
    pub start_rent: NaiveDate,
    #[ts(as = "String")]
    pub end_rent: NaiveDate,
}

// =============================================================================
// Driver Incentive
// =============================================================================

/// Bonus accrued by a driver when a booking they drove is finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DriverIncentive {
    pub id: String,
    pub booking_id: String,
    pub incentive_cents: i64,
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl DriverIncentive {
    #[inline]
    pub fn incentive(&self) -> Money {
        Money::from_cents(self.incentive_cents)
    }
}

// =============================================================================
// Catalog Inputs
// =============================================================================

/// Input for registering a car.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCar {
    pub name: String,
    pub stock: i64,
    pub daily_rent_cents: i64,
}

/// Input for registering a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub nik: String,
    pub phone_number: String,
    #[serde(default)]
    pub membership_id: Option<String>,
}

/// Input for registering a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDriver {
    pub name: String,
    pub nik: String,
    pub phone_number: String,
    pub daily_cost_cents: i64,
}

// =============================================================================
// Read Views
// =============================================================================

/// A customer together with their membership plan, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerDetails {
    #[serde(flatten)]
    pub customer: Customer,
    pub membership: Option<Membership>,
}

/// A booking joined with everything it references, for display.
///
/// Soft-deleted cars and drivers still appear here so finished bookings keep
/// their history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub customer: CustomerDetails,
    pub car: Car,
    pub driver: Option<Driver>,
    pub booking_type: BookingType,
}

/// Result of deleting an unfinished booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeleteConfirmation {
    pub booking_id: String,
    pub restored_car_stock: i64,
}

/// All incentives accrued by one driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IncentiveSummary {
    pub driver_id: String,
    pub incentives: Vec<DriverIncentive>,
    pub total_incentive_cents: i64,
}

impl IncentiveSummary {
    /// Builds a summary, summing the incentive amounts.
    pub fn new(driver_id: impl Into<String>, incentives: Vec<DriverIncentive>) -> Self {
        let total: Money = incentives.iter().map(DriverIncentive::incentive).sum();
        IncentiveSummary {
            driver_id: driver_id.into(),
            incentives,
            total_incentive_cents: total.cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BOOKING_TYPE_CAR_ONLY;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_booking_type_requires_driver() {
        let with_driver = BookingType {
            id: "bt-2".to_string(),
            label: BOOKING_TYPE_CAR_AND_DRIVER.to_string(),
            description: "Rent Car and a Driver".to_string(),
        };
        let car_only = BookingType {
            id: "bt-1".to_string(),
            label: BOOKING_TYPE_CAR_ONLY.to_string(),
            description: "Rent Car only".to_string(),
        };

        assert!(with_driver.requires_driver());
        assert!(!car_only.requires_driver());
    }

    #[test]
    fn test_car_availability() {
        let mut car = Car {
            id: "car-1".to_string(),
            name: "Avanza".to_string(),
            stock: 1,
            daily_rent_cents: Money::from_major(100_000).cents(),
            deleted_at: None,
            created_at: Utc::now(),
        };
        assert!(car.is_available());

        car.stock = 0;
        assert!(!car.is_available());

        car.stock = 2;
        car.deleted_at = Some(Utc::now());
        assert!(!car.is_available());
    }

    #[test]
    fn test_booking_period_and_money_accessors() {
        let now = Utc::now();
        let booking = Booking {
            id: "b-1".to_string(),
            customer_id: "c-1".to_string(),
            car_id: "car-1".to_string(),
            booking_type_id: "bt-1".to_string(),
            driver_id: None,
            start_rent: date(2024, 1, 10),
            end_rent: date(2024, 1, 12),
            finished: false,
            total_cost_cents: 30_000_000,
            discount_cents: 0,
            total_driver_cost_cents: 0,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(booking.period().unwrap().days(), 3);
        assert_eq!(booking.total_cost(), Money::from_major(300_000));
        assert!(booking.is_active());
    }

    #[test]
    fn test_incentive_summary_total() {
        let now = Utc::now();
        let incentive = |id: &str, cents: i64| DriverIncentive {
            id: id.to_string(),
            booking_id: format!("booking-{id}"),
            incentive_cents: cents,
            deleted_at: None,
            created_at: now,
        };

        let summary = IncentiveSummary::new("d-1", vec![incentive("1", 1_500_000), incentive("2", 250)]);
        assert_eq!(summary.total_incentive_cents, 1_500_250);
        assert_eq!(summary.incentives.len(), 2);
    }

    #[test]
    fn test_new_booking_driver_defaults_to_none() {
        let json = r#"{
            "customer_id": "c-1",
            "car_id": "car-1",
            "booking_type_id": "bt-1",
            "start_rent": "2024-01-10",
            "end_rent": "2024-01-12"
        }"#;
        let input: NewBooking = serde_json::from_str(json).unwrap();
        assert_eq!(input.driver_id, None);
        assert_eq!(input.start_rent, date(2024, 1, 10));
    }
}
