//! # Money Module
//!
//! Rental amounts are whole cents held in an `i64`; percentages are basis
//! points. A percentage is applied to an amount exactly once, when a quote or
//! an incentive is produced, and the rounded cents are what gets stored.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  daily rent 100000.10  →  10_000_010 cents                              │
//! │  × 3 days              →  30_000_030 cents                              │
//! │  Gold 1500 bps         →   4_500_004.5 → 4_500_004 cents (half-even)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rental_core::money::{DiscountRate, Money};
//!
//! let daily_rent = Money::from_major(100_000);
//! let base = daily_rent * 3_i64;
//! let discount = base.percent_of(DiscountRate::from_bps(1500));
//!
//! assert_eq!(base, Money::from_major(300_000));
//! assert_eq!(discount, Money::from_major(45_000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use ts_rs::TS;

/// Basis points in 100%.
pub const BPS_PER_WHOLE: u32 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// An amount of rental currency in cents.
///
/// Signed so that intermediate differences may dip below zero; stored values
/// are validated non-negative before they reach the store.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Car.daily_rent ───┐                                                    │
/// │                    ├──► Quote.base_cost ──► Booking.total_cost          │
/// │  RentalPeriod.days ┘          │                                         │
/// │                               ├──► Quote.discount ──► Booking.discount  │
/// │  Membership.discount_rate ────┘                                         │
/// │                                                                         │
/// │  Driver.daily_cost × days ──► Booking.total_driver_cost                 │
/// │  base_cost × 5% ───────────► DriverIncentive.incentive (on finish)      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// ```rust
    /// use rental_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(10_000_050).to_string(), "100000.50");
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Whole units, so `from_major(150_000)` is 15,000,000 cents.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// `None` when the product does not fit in cents.
    #[inline]
    pub const fn checked_mul(self, days: i64) -> Option<Money> {
        match self.0.checked_mul(days) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self × rate`, rounded to the cent, ties going to the even cent.
    ///
    /// | exact   | stored |
    /// |---------|--------|
    /// | 0.5     | 0      |
    /// | 1.5     | 2      |
    /// | 2.5     | 2      |
    /// | -2.5    | -2     |
    ///
    /// ```rust
    /// use rental_core::money::{DiscountRate, Money};
    ///
    /// let one_percent = DiscountRate::from_bps(100);
    /// assert_eq!(Money::from_cents(150).percent_of(one_percent).cents(), 2);
    /// assert_eq!(Money::from_cents(250).percent_of(one_percent).cents(), 2);
    /// ```
    pub fn percent_of(&self, rate: DiscountRate) -> Money {
        // cents × bps can exceed i64 for large totals
        let scaled = self.0 as i128 * rate.bps() as i128;
        Money::from_cents(div_round_half_even(scaled, BPS_PER_WHOLE as i128) as i64)
    }
}

/// Integer division rounding half to even, symmetric around zero.
fn div_round_half_even(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let twice_remainder = (numerator % denominator).abs() * 2;
    let divisor = denominator.abs();

    let round_away = twice_remainder > divisor || (twice_remainder == divisor && quotient % 2 != 0);
    if !round_away {
        return quotient;
    }

    if (numerator < 0) != (denominator < 0) {
        quotient - 1
    } else {
        quotient + 1
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain amount with two decimals, e.g. `300000.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Scales by a count of days.
impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, days: i64) -> Self {
        Money(self.0 * days)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// A percentage in basis points: 1500 is the Gold discount (15 %), 500 the
/// driver incentive (5 %).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Whole percent, `from_percent(15)` is 1500 bps.
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        DiscountRate(percent * 100)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
