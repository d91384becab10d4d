//! # Repository Module
//!
//! Database repository implementations for the rental store.
//!
//! ## Two Ways In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Statements and Repositories                          │
//! │                                                                         │
//! │  Each module holds its SQL as `pub(crate)` statement functions that    │
//! │  take `&mut SqliteConnection`. They are reached two ways:              │
//! │                                                                         │
//! │  db.cars().get_by_id(id)          StoreTx::active_car(id)              │
//! │       │                                │                                │
//! │       │ pool.acquire()                 │ &mut *transaction              │
//! │       ▼                                ▼                                │
//! │  car::fetch_active(&mut conn, id) ◄────┘                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Repositories serve reads and catalog inserts; everything a booking    │
//! │  operation touches goes through one StoreTx.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`MembershipRepository`] - Membership plans
//! - [`CustomerRepository`] - Customers
//! - [`CarRepository`] - Cars and their stock
//! - [`DriverRepository`] - Drivers
//! - [`BookingTypeRepository`] - Booking type reference data
//! - [`BookingRepository`] - Booking reads and joined views
//! - [`IncentiveRepository`] - Driver incentives

use uuid::Uuid;

pub mod booking;
pub mod booking_type;
pub mod car;
pub mod customer;
pub mod driver;
pub mod incentive;
pub mod membership;

pub use booking::BookingRepository;
pub use booking_type::BookingTypeRepository;
pub use car::CarRepository;
pub use customer::CustomerRepository;
pub use driver::DriverRepository;
pub use incentive::IncentiveRepository;
pub use membership::MembershipRepository;

/// Generates a new entity ID (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
