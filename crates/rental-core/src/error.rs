//! # Error Types
//!
//! Failures the rental domain can report before anything touches the store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError   bad input, caught before any write                   │
//! │        │ #[from]                                                        │
//! │        ▼                                                                │
//! │  CoreError         rule broken: missing entity, no stock, finished      │
//! │        │                                                                │
//! │        ▼           rental_db::DbError joins here                        │
//! │  rental_service::ServiceError { code, message, detail }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use thiserror::Error;

use crate::integrity::ConstraintViolation;

// =============================================================================
// Core Error
// =============================================================================

/// Booking rules that refused an operation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist (or is soft-deleted).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Stock was zero at create time, or a concurrent booking took the last
    /// unit.
    #[error("Car {car_id} is not available for booking")]
    CarUnavailable { car_id: String },

    /// Finished bookings are read-only: no update, no second finish.
    #[error("Cannot {operation} booking {booking_id}: booking is already finished")]
    BookingFinished {
        booking_id: String,
        operation: &'static str,
    },

    /// The customer has no membership to remove.
    #[error("Customer {customer_id} is not subscribed to any membership")]
    NoMembership { customer_id: String },

    /// A destructive operation was refused by the integrity guard.
    #[error("{0}")]
    Constraint(ConstraintViolation),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<ConstraintViolation> for CoreError {
    fn from(violation: ConstraintViolation) -> Self {
        CoreError::Constraint(violation)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Rejected input. Messages name the offending field.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Empty after trimming.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// NIK is a fixed 16 digits.
    #[error("{field} must be exactly {len} characters")]
    WrongLength { field: String, len: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Not a UUID, not digits, and similar.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Rental period runs backwards.
    #[error("Start date {start} must not be after end date {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },

    /// Rental cannot start before today.
    #[error("Start date {start} cannot be in the past (today is {today})")]
    StartInPast { start: NaiveDate, today: NaiveDate },

    /// A driver was given for a booking type that does not take one.
    #[error("Driver can only be assigned for '{required_type}' booking type, got '{booking_type}'")]
    DriverNotAllowed {
        booking_type: String,
        required_type: &'static str,
    },

    /// The booking type needs a driver but none was given.
    #[error("Driver must be assigned for '{booking_type}' booking type")]
    DriverRequired { booking_type: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
