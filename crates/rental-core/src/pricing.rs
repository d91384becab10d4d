//! # Pricing
//!
//! Pure cost computation for bookings.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  days        = (end − start) in whole days + 1   (inclusive range)     │
//! │  base_cost   = days × car.daily_rent                                    │
//! │  discount    = base_cost × membership rate        (0 without membership)│
//! │  driver_cost = days × driver.daily_cost           (0 without driver)    │
//! │                                                                         │
//! │  on finish, with a driver:                                              │
//! │  incentive   = base_cost × 5%   (before discount)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Percentages are rounded to the cent with Bankers Rounding, once, here.
//! Persisted amounts are never re-derived from each other later.
//!
//! Periods are capped at [`MAX_RENTAL_DAYS`]; every product and sum is
//! checked, so a rate read back from the store that is too large for the
//! period yields `OutOfRange` instead of wrapping.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{DiscountRate, Money};
use crate::{DRIVER_INCENTIVE_RATE, MAX_RENTAL_DAYS};

// =============================================================================
// Rental Period
// =============================================================================

/// An inclusive range of calendar days, `start <= end`, at most
/// [`MAX_RENTAL_DAYS`] long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RentalPeriod {
    #[ts(as = "String")]
    start: NaiveDate,
    #[ts(as = "String")]
    end: NaiveDate,
}

impl RentalPeriod {
    /// Creates a period, rejecting a start after the end or a rental longer
    /// than [`MAX_RENTAL_DAYS`].
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use rental_core::pricing::RentalPeriod;
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    /// assert_eq!(RentalPeriod::new(day, day).unwrap().days(), 1);
    /// ```
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::StartAfterEnd { start, end });
        }

        let period = RentalPeriod { start, end };
        if period.days() > MAX_RENTAL_DAYS {
            return Err(ValidationError::OutOfRange {
                field: "rental_days".to_string(),
                min: 1,
                max: MAX_RENTAL_DAYS,
            });
        }
        Ok(period)
    }

    #[inline]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[inline]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of rented days, always >= 1.
    #[inline]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

// =============================================================================
// Quote
// =============================================================================

/// Everything the calculator needs, as snapshots of the related entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingInput {
    pub period: RentalPeriod,
    pub daily_rent: Money,
    pub membership_discount: Option<DiscountRate>,
    pub driver_daily_cost: Option<Money>,
}

/// Costs computed for a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quote {
    pub days: i64,
    pub base_cost: Money,
    pub discount: Money,
    pub driver_cost: Money,
}

impl Quote {
    /// What the customer pays: base − discount + driver.
    ///
    /// Display only; bookings persist the three components.
    pub fn amount_due(&self) -> Money {
        self.base_cost - self.discount + self.driver_cost
    }
}

/// Computes the costs of a booking.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use rental_core::money::Money;
/// use rental_core::pricing::{quote, PricingInput, RentalPeriod};
///
/// let period = RentalPeriod::new(
///     NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
/// ).unwrap();
///
/// let q = quote(&PricingInput {
///     period,
///     daily_rent: Money::from_major(100_000),
///     membership_discount: None,
///     driver_daily_cost: Some(Money::from_major(50_000)),
/// }).unwrap();
///
/// assert_eq!(q.base_cost, Money::from_major(300_000));
/// assert_eq!(q.driver_cost, Money::from_major(150_000));
/// ```
pub fn quote(input: &PricingInput) -> Result<Quote, ValidationError> {
    let days = input.period.days();
    let base_cost = cost_over(input.daily_rent, days, "total_cost")?;

    let discount = input
        .membership_discount
        .map(|rate| base_cost.percent_of(rate))
        .unwrap_or_default();

    let driver_cost = match input.driver_daily_cost {
        Some(daily) => cost_over(daily, days, "total_driver_cost")?,
        None => Money::zero(),
    };

    base_cost
        .checked_add(driver_cost)
        .ok_or_else(|| too_large("total_cost"))?;

    Ok(Quote {
        days,
        base_cost,
        discount,
        driver_cost,
    })
}

/// Incentive accrued by the driver when a booking is finished.
///
/// Computed from the undiscounted base cost (days × daily rent).
pub fn driver_incentive(period: RentalPeriod, daily_rent: Money) -> Result<Money, ValidationError> {
    let base_cost = cost_over(daily_rent, period.days(), "incentive")?;
    Ok(base_cost.percent_of(DRIVER_INCENTIVE_RATE))
}

fn cost_over(daily: Money, days: i64, field: &str) -> Result<Money, ValidationError> {
    daily.checked_mul(days).ok_or_else(|| too_large(field))
}

fn too_large(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
