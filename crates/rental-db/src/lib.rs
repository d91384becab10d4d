//! # rental-db: Entity Store for Car Rental Bookings
//!
//! SQLite storage for customers, cars, drivers, memberships, booking types,
//! bookings and driver incentives, using sqlx for async operations.
//!
//! ## Where It Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rental Data Flow                                 │
//! │                                                                         │
//! │  rental-service (BookingLifecycle, IntegrityGuard)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     rental-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (car.rs ...) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CarRepo       │    │ 001_initial_ │  │   │
//! │  │   │ StoreTx       │    │ BookingRepo   │    │ schema.sql   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - `DbConfig` and the `Database` handle
//! - [`tx`] - Scoped write transactions
//! - [`migrations`] - Schema embedded at compile time
//! - [`repository`] - Per-entity statements and repositories
//! - [`seed`] - Default memberships and booking types
//! - [`error`] - `DbError` and sqlx classification
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rental_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("rental.db")).await?;
//! rental_db::seed::seed_defaults(&db).await?;
//!
//! let cars = db.cars().list().await?;
//! ```

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;
pub mod tx;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use tx::StoreTx;

pub use repository::{
    BookingRepository, BookingTypeRepository, CarRepository, CustomerRepository,
    DriverRepository, IncentiveRepository, MembershipRepository,
};
