//! # rental-service: Booking Lifecycle and Referential Integrity
//!
//! Orchestrates every multi-entity operation of the car rental system on top
//! of `rental-db`, one transaction per operation.
//!
//! ## Module Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        rental-service                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐                   │
//! │  │  lifecycle   │  │  integrity   │  │  membership  │                   │
//! │  │ create/update│  │ delete guard │  │ (un)subscribe│                   │
//! │  │ finish/delete│  │ car/driver/  │  │              │                   │
//! │  │              │  │ customer     │  │              │                   │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘                   │
//! │         │                 │                 │                           │
//! │         └─────────┬───────┴─────────┬───────┘                           │
//! │                   ▼                 ▼                                   │
//! │           rental_db::StoreTx   rental_core (pricing, policy)            │
//! │                                                                         │
//! │  error      ServiceError { code, message, detail }                     │
//! │  config     ServiceConfig::from_env()                                   │
//! │  telemetry  init_tracing()                                              │
//! │  clock      Clock / SystemClock / FixedClock                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let config = ServiceConfig::from_env()?;
//! init_tracing(&config.log_filter);
//!
//! let service = RentalService::connect(&config).await?;
//! let booking = service.bookings().create_booking(&input).await?;
//! service.bookings().finish_booking(&booking.booking.id).await?;
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod incentives;
pub mod integrity;
pub mod lifecycle;
pub mod membership;
pub mod service;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, ServiceConfig};
pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use incentives::IncentiveLedger;
pub use integrity::IntegrityGuard;
pub use lifecycle::BookingLifecycle;
pub use membership::MembershipManager;
pub use service::RentalService;
pub use telemetry::init_tracing;
