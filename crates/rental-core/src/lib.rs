//! # rental-core: Pure Business Logic for Car Rental Bookings
//!
//! Pricing, validation, sparse patches and the deletion policy, as pure
//! functions with zero I/O dependencies.
//!
//! ## Where It Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Car Rental Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Boundary layer (HTTP handlers, elsewhere)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  rental-service                                 │   │
//! │  │    create / update / finish / delete booking, integrity guard   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rental-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  pricing  │  │   patch   │  │ integrity │  │   │
//! │  │   │  Booking  │  │   Quote   │  │  Patch<T> │  │  policy   │  │   │
//! │  │   │    Car    │  │   Money   │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  rental-db (Entity Store)                       │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Car, Driver, Booking, ...)
//! - [`money`] - Money and DiscountRate with integer arithmetic
//! - [`pricing`] - Rental periods, quotes, driver incentives
//! - [`patch`] - Sparse partial updates
//! - [`integrity`] - Deletion policy for referenced entities
//! - [`validation`] - Field and booking rule validation
//! - [`error`] - `CoreError` and `ValidationError`
//!
//! ## Quoting a Booking
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rental_core::money::{DiscountRate, Money};
//! use rental_core::pricing::{quote, PricingInput, RentalPeriod};
//!
//! let period = RentalPeriod::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
//! ).unwrap();
//!
//! let q = quote(&PricingInput {
//!     period,
//!     daily_rent: Money::from_major(100_000),
//!     membership_discount: Some(DiscountRate::from_percent(15)),
//!     driver_daily_cost: None,
//! }).unwrap();
//!
//! assert_eq!(q.base_cost, Money::from_major(300_000));
//! assert_eq!(q.discount, Money::from_major(45_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod integrity;
pub mod money;
pub mod patch;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use integrity::{
    ConstraintInfo, ConstraintKind, ConstraintViolation, DeletionAction, DeletionOutcome,
    EntityKind,
};
pub use money::{DiscountRate, Money};
pub use patch::{BookingPatch, Patch};
pub use pricing::{Quote, RentalPeriod};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Label of the booking type without a driver.
pub const BOOKING_TYPE_CAR_ONLY: &str = "Car Only";

/// Label of the booking type that requires a driver.
pub const BOOKING_TYPE_CAR_AND_DRIVER: &str = "Car & Driver";

/// Share of the undiscounted base cost paid to the driver on finish (5%).
pub const DRIVER_INCENTIVE_RATE: DiscountRate = DiscountRate::from_bps(500);

/// Maximum length of customer, driver, car and membership names.
pub const MAX_NAME_LENGTH: usize = 100;

/// Length of a national identity number (NIK).
///
/// Customers must match it exactly; drivers may use shorter numbers.
pub const NIK_LENGTH: usize = 16;

/// Maximum length of a phone number, including a leading `+`.
pub const MAX_PHONE_LENGTH: usize = 15;

/// Longest bookable rental, in days (ten years).
pub const MAX_RENTAL_DAYS: i64 = 3_650;

/// Highest daily rent or driver cost accepted, in cents (10,000,000,000.00).
pub const MAX_DAILY_RATE_CENTS: i64 = 1_000_000_000_000;
