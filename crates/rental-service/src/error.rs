//! # Service Error Type
//!
//! Unified error type returned by every service operation.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow                                           │
//! │                                                                         │
//! │  ValidationError ─► CoreError::Validation ──► INVALID_ARGUMENT          │
//! │  CoreError::NotFound ─────────────────────► NOT_FOUND                   │
//! │  CoreError::CarUnavailable ───────────────► CONFLICT                    │
//! │  CoreError::BookingFinished ──────────────► FAILED_PRECONDITION         │
//! │  CoreError::NoMembership ─────────────────► FAILED_PRECONDITION         │
//! │  CoreError::Constraint ───────────────────► FAILED_PRECONDITION + detail│
//! │  DbError::NotFound ───────────────────────► NOT_FOUND                   │
//! │  any other DbError ───────────────────────► INTERNAL (logged)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failing operation has already rolled its transaction back by the time
//! the caller sees the error.

use serde::Serialize;
use std::fmt;

use rental_core::{ConstraintViolation, CoreError, ValidationError};
use rental_db::DbError;

/// Error returned from service operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "FAILED_PRECONDITION",
///   "message": "Cannot delete car with active bookings (1 active of 1). ...",
///   "detail": {
///     "entity_type": "car",
///     "entity_id": "…",
///     "constraint": "active_bookings",
///     "total_bookings": 1,
///     "active_bookings": 1
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Why a deletion was refused, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ConstraintViolation>,
}

/// Error codes for service responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A referenced entity is absent (404)
    NotFound,

    /// Malformed input (400)
    InvalidArgument,

    /// No car unit available (409)
    Conflict,

    /// The current state forbids the operation (412)
    FailedPrecondition,

    /// Store failure; nothing was applied (500)
    Internal,
}

impl ServiceError {
    /// Creates a new service error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ServiceError {
            code,
            message: message.into(),
            detail: None,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ServiceError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::InvalidArgument, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::Internal, message)
    }

    /// Creates a failed-precondition error carrying the refused constraint.
    pub fn constraint(violation: ConstraintViolation) -> Self {
        ServiceError {
            code: ErrorCode::FailedPrecondition,
            message: violation.to_string(),
            detail: Some(violation),
        }
    }
}

/// Converts database errors to service errors.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::not_found(&entity, &id),
            DbError::PoolExhausted | DbError::Busy(_) => {
                tracing::error!(error = %err, "Store unavailable");
                ServiceError::internal("Database is busy, please retry")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ServiceError::internal("Database operation failed")
            }
        }
    }
}

/// Converts core errors to service errors.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => ServiceError::not_found(entity, &id),
            CoreError::CarUnavailable { .. } => ServiceError::new(ErrorCode::Conflict, err.to_string()),
            CoreError::BookingFinished { .. } | CoreError::NoMembership { .. } => {
                ServiceError::new(ErrorCode::FailedPrecondition, err.to_string())
            }
            CoreError::Constraint(violation) => ServiceError::constraint(violation),
            CoreError::Validation(e) => ServiceError::from(e),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::invalid_argument(err.to_string())
    }
}

impl From<ConstraintViolation> for ServiceError {
    fn from(violation: ConstraintViolation) -> Self {
        ServiceError::constraint(violation)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
