//! # Rental Service
//!
//! Entry point that wires the store and every operation group together.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ServiceConfig::from_env()                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  init_tracing(&config.log_filter)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RentalService::connect(&config)                                        │
//! │       ├── Database::new(config.db_config())   pool + migrations        │
//! │       └── seed_defaults()                     when enabled             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  service.bookings() / integrity() / memberships() / incentives()        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use rental_db::seed::seed_defaults;
use rental_db::Database;

use crate::clock::{Clock, SystemClock};
use crate::config::ServiceConfig;
use crate::error::ServiceResult;
use crate::incentives::IncentiveLedger;
use crate::integrity::IntegrityGuard;
use crate::lifecycle::BookingLifecycle;
use crate::membership::MembershipManager;

/// All rental operations over one store.
#[derive(Debug, Clone)]
pub struct RentalService<C: Clock = SystemClock> {
    db: Database,
    bookings: BookingLifecycle<C>,
    integrity: IntegrityGuard,
    memberships: MembershipManager,
    incentives: IncentiveLedger,
}

impl RentalService<SystemClock> {
    /// Connects to the configured store.
    pub async fn connect(config: &ServiceConfig) -> ServiceResult<Self> {
        Self::connect_with_clock(config, SystemClock).await
    }
}

impl<C: Clock> RentalService<C> {
    /// Connects to the configured store with a custom clock.
    pub async fn connect_with_clock(config: &ServiceConfig, clock: C) -> ServiceResult<Self> {
        let db = Database::new(config.db_config()).await?;

        if config.seed_defaults {
            let report = seed_defaults(&db).await?;
            info!(
                memberships = report.memberships,
                booking_types = report.booking_types,
                "Default data seeded"
            );
        }

        Ok(Self::from_database(db, clock))
    }

    /// Wraps an already opened store.
    pub fn from_database(db: Database, clock: C) -> Self {
        RentalService {
            bookings: BookingLifecycle::new(db.clone(), clock),
            integrity: IntegrityGuard::new(db.clone()),
            memberships: MembershipManager::new(db.clone()),
            incentives: IncentiveLedger::new(db.clone()),
            db,
        }
    }

    pub fn bookings(&self) -> &BookingLifecycle<C> {
        &self.bookings
    }

    pub fn integrity(&self) -> &IntegrityGuard {
        &self.integrity
    }

    pub fn memberships(&self) -> &MembershipManager {
        &self.memberships
    }

    pub fn incentives(&self) -> &IncentiveLedger {
        &self.incentives
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Closes the store. Every later operation fails with `INTERNAL`.
    pub async fn close(&self) {
        self.db.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::ErrorCode;
    use crate::testing::{booking_type, date, seed_catalog, today};
    use rental_core::{NewBooking, BOOKING_TYPE_CAR_ONLY};
    use std::time::Duration;
    use tempfile::TempDir;

    fn file_config(dir: &TempDir, max_connections: u32) -> ServiceConfig {
        ServiceConfig {
            database_path: dir.path().join("rental.db"),
            max_connections,
            busy_timeout: Duration::from_secs(30),
            ..ServiceConfig::default()
        }
    }

    #[tokio::test]
    async fn test_connect_seeds_defaults_once() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir, 2);

        let service = RentalService::connect(&config).await.unwrap();
        assert_eq!(service.memberships().list_memberships().await.unwrap().len(), 3);
        service.close().await;

        let reopened = RentalService::connect(&config).await.unwrap();
        assert_eq!(reopened.memberships().list_memberships().await.unwrap().len(), 3);
        assert_eq!(reopened.database().booking_types().list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_closed_service_reports_internal() {
        let dir = TempDir::new().unwrap();
        let service = RentalService::connect(&file_config(&dir, 1)).await.unwrap();
        service.close().await;

        let err = service.bookings().list_bookings().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Internal);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_never_oversell() {
        const ATTEMPTS: usize = 8;
        const STOCK: i64 = 3;

        let dir = TempDir::new().unwrap();
        let service =
            RentalService::connect_with_clock(&file_config(&dir, ATTEMPTS as u32), FixedClock(today()))
                .await
                .unwrap();
        let db = service.database().clone();
        let (customer, _, car, _) = seed_catalog(&db, STOCK).await;
        let car_only = booking_type(&db, BOOKING_TYPE_CAR_ONLY).await;

        let input = NewBooking {
            customer_id: customer.id.clone(),
            car_id: car.id.clone(),
            booking_type_id: car_only.id.clone(),
            driver_id: None,
            start_rent: date(2024, 1, 10),
            end_rent: date(2024, 1, 12),
        };

        let mut handles = Vec::with_capacity(ATTEMPTS);
        for _ in 0..ATTEMPTS {
            let lifecycle = service.bookings().clone();
            let input = input.clone();
            handles.push(tokio::spawn(async move {
                lifecycle.create_booking(&input).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert_eq!(err.code, ErrorCode::Conflict, "{err}"),
            }
        }

        assert_eq!(created, STOCK as usize);
        let car = db.cars().get_any(&car.id).await.unwrap().unwrap();
        assert_eq!(car.stock, 0);
        assert_eq!(service.bookings().list_bookings().await.unwrap().len(), STOCK as usize);
    }
}
