//! # Validation Module
//!
//! Input validation for stored entities and booking requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Boundary (out of scope)                                      │
//! │  └── Deserialization into typed inputs                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Field shape (names, national IDs, phone numbers)                  │
//! │  ├── Amount and rate ranges                                            │
//! │  └── Booking rules (not in the past, driver pairing)                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lengths are counted in characters, not bytes.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::BPS_PER_WHOLE;
use crate::types::{BookingType, NewCar, NewCustomer, NewDriver};
use crate::{
    BOOKING_TYPE_CAR_AND_DRIVER, MAX_DAILY_RATE_CENTS, MAX_NAME_LENGTH, MAX_PHONE_LENGTH,
    NIK_LENGTH,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(value)
}

fn max_chars(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a person or car name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
///
/// ## Example
/// ```rust
/// use rental_core::validation::validate_name;
///
/// assert!(validate_name("Toyota Avanza").is_ok());
/// assert!(validate_name("   ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = required("name", name)?;
    max_chars("name", name, MAX_NAME_LENGTH)
}

/// Validates a customer's national identity number: exactly 16 characters.
pub fn validate_customer_nik(nik: &str) -> ValidationResult<()> {
    let nik = required("nik", nik)?;
    if nik.chars().count() != NIK_LENGTH {
        return Err(ValidationError::WrongLength {
            field: "nik".to_string(),
            len: NIK_LENGTH,
        });
    }
    Ok(())
}

/// Validates a driver's national identity number: at most 16 characters.
pub fn validate_driver_nik(nik: &str) -> ValidationResult<()> {
    let nik = required("nik", nik)?;
    max_chars("nik", nik, NIK_LENGTH)
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty
/// - At most 15 characters
/// - Digits, with an optional leading `+`
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = required("phone_number", phone)?;
    max_chars("phone_number", phone, MAX_PHONE_LENGTH)?;

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone_number".to_string(),
            reason: "must contain only digits, optionally prefixed with '+'".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a monetary amount in cents.
///
/// ## Example
/// ```rust
/// use rental_core::validation::validate_non_negative_cents;
///
/// assert!(validate_non_negative_cents("daily_rent", 0).is_ok());
/// assert!(validate_non_negative_cents("daily_rent", -100).is_err());
/// ```
pub fn validate_non_negative_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a car's daily rent or a driver's daily cost: 0 up to
/// [`MAX_DAILY_RATE_CENTS`].
pub fn validate_daily_rate(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_DAILY_RATE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_DAILY_RATE_CENTS,
        });
    }
    Ok(())
}

/// Validates a car stock count.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a discount rate in basis points: 0% to 100%.
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    if bps > BPS_PER_WHOLE {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: i64::from(BPS_PER_WHOLE),
        });
    }
    Ok(())
}

// =============================================================================
// Booking Rules
// =============================================================================

/// Rejects a rental starting before `today`.
///
/// Comparison is by calendar day, so a rental starting today is always valid
/// regardless of the time of day.
pub fn validate_start_not_in_past(start: NaiveDate, today: NaiveDate) -> ValidationResult<()> {
    if start < today {
        return Err(ValidationError::StartInPast { start, today });
    }
    Ok(())
}

/// Checks that a driver is given exactly when the booking type takes one.
///
/// ## Pairing
/// ```text
/// ┌──────────────────┬────────────────────┬────────────────────┐
/// │ booking type     │ driver given       │ no driver          │
/// ├──────────────────┼────────────────────┼────────────────────┤
/// │ Car & Driver     │ ok                 │ DriverRequired     │
/// │ anything else    │ DriverNotAllowed   │ ok                 │
/// └──────────────────┴────────────────────┴────────────────────┘
/// ```
pub fn validate_driver_pairing(
    booking_type: &BookingType,
    driver_id: Option<&str>,
) -> ValidationResult<()> {
    match (booking_type.requires_driver(), driver_id.is_some()) {
        (true, true) | (false, false) => Ok(()),
        (false, true) => Err(ValidationError::DriverNotAllowed {
            booking_type: booking_type.label.clone(),
            required_type: BOOKING_TYPE_CAR_AND_DRIVER,
        }),
        (true, false) => Err(ValidationError::DriverRequired {
            booking_type: booking_type.label.clone(),
        }),
    }
}

// =============================================================================
// Entity Validators
// =============================================================================

pub fn validate_new_car(car: &NewCar) -> ValidationResult<()> {
    validate_name(&car.name)?;
    validate_stock(car.stock)?;
    validate_daily_rate("daily_rent", car.daily_rent_cents)
}

pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_name(&customer.name)?;
    validate_customer_nik(&customer.nik)?;
    validate_phone(&customer.phone_number)
}

pub fn validate_new_driver(driver: &NewDriver) -> ValidationResult<()> {
    validate_name(&driver.name)?;
    validate_driver_nik(&driver.nik)?;
    validate_phone(&driver.phone_number)?;
    validate_daily_rate("daily_cost", driver.daily_cost_cents)
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

    fn booking_type(label: &str) -> BookingType {
        BookingType {
            id: "bt".to_string(),
            label: label.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Budi Santoso").is_ok());
        assert!(validate_name(&"A".repeat(100)).is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name(&"A".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_nik() {
        assert!(validate_customer_nik("3171234567890001").is_ok());
        assert!(matches!(
            validate_customer_nik("317123"),
            Err(ValidationError::WrongLength { len: 16, .. })
        ));

        assert!(validate_driver_nik("317123").is_ok());
        assert!(validate_driver_nik("31712345678900012").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("081234567890").is_ok());
        assert!(validate_phone("+6281234567890").is_ok());

        assert!(validate_phone("").is_err());
        assert!(validate_phone("0812-3456").is_err());
        assert!(validate_phone("0812345678901234").is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
        assert!(validate_non_negative_cents("daily_rent", 10_000_000).is_ok());
        assert!(validate_discount_bps(0).is_ok());
        assert!(validate_discount_bps(10_000).is_ok());
        assert!(validate_discount_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_daily_rate_bounds() {
        assert!(validate_daily_rate("daily_rent", 0).is_ok());
        assert!(validate_daily_rate("daily_rent", MAX_DAILY_RATE_CENTS).is_ok());
        assert!(validate_daily_rate("daily_rent", -1).is_err());

        let err = validate_daily_rate("daily_cost", MAX_DAILY_RATE_CENTS + 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("daily_cost must be between 0 and {}", MAX_DAILY_RATE_CENTS)
        );
    }

    #[test]
    fn test_start_today_is_not_in_past() {
        let today = date(2024, 1, 10);
        assert!(validate_start_not_in_past(today, today).is_ok());
        assert!(validate_start_not_in_past(date(2024, 1, 11), today).is_ok());
        assert!(matches!(
            validate_start_not_in_past(date(2024, 1, 9), today),
            Err(ValidationError::StartInPast { .. })
        ));
    }

    #[test]
    fn test_driver_pairing() {
        let with_driver = booking_type(BOOKING_TYPE_CAR_AND_DRIVER);
        let car_only = booking_type(BOOKING_TYPE_CAR_ONLY);

        assert!(validate_driver_pairing(&with_driver, Some("d-1")).is_ok());
        assert!(validate_driver_pairing(&car_only, None).is_ok());

        assert!(matches!(
            validate_driver_pairing(&car_only, Some("d-1")),
            Err(ValidationError::DriverNotAllowed { .. })
        ));
        assert!(matches!(
            validate_driver_pairing(&with_driver, None),
            Err(ValidationError::DriverRequired { .. })
        ));
    }

    #[test]
    fn test_validate_new_entities() {
        let car = NewCar {
            name: "Avanza".to_string(),
            stock: 2,
            daily_rent_cents: 10_000_000,
        };
        assert!(validate_new_car(&car).is_ok());

        let priceless = NewCar {
            daily_rent_cents: i64::MAX / 2,
            ..car
        };
        assert!(validate_new_car(&priceless).is_err());

        let driver = NewDriver {
            name: "Joko".to_string(),
            nik: "3171".to_string(),
            phone_number: "0811".to_string(),
            daily_cost_cents: -5,
        };
        assert!(validate_new_driver(&driver).is_err());
    }
}
