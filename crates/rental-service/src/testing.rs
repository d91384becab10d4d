//! Shared fixtures for the service tests.

use chrono::NaiveDate;

use rental_core::{BookingType, Car, Customer, Driver, Money, NewCar, NewCustomer, NewDriver};
use rental_core::{BOOKING_TYPE_CAR_AND_DRIVER, BOOKING_TYPE_CAR_ONLY};
use rental_db::seed::seed_defaults;
use rental_db::{Database, DbConfig};

use crate::clock::FixedClock;
use crate::incentives::IncentiveLedger;
use crate::integrity::IntegrityGuard;
use crate::lifecycle::BookingLifecycle;
use crate::membership::MembershipManager;

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The day every fixture clock is stopped on.
pub(crate) fn today() -> NaiveDate {
    date(2024, 1, 1)
}

pub(crate) struct Fixture {
    pub db: Database,
    pub lifecycle: BookingLifecycle<FixedClock>,
    pub guard: IntegrityGuard,
    pub memberships: MembershipManager,
    pub incentives: IncentiveLedger,
    /// No membership.
    pub customer: Customer,
    /// Gold member (15%).
    pub member: Customer,
    /// 100,000.00 per day.
    pub car: Car,
    /// 50,000.00 per day.
    pub driver: Driver,
    pub car_only: BookingType,
    pub car_and_driver: BookingType,
}

pub(crate) async fn seed_catalog(db: &Database, stock: i64) -> (Customer, Customer, Car, Driver) {
    seed_defaults(db).await.unwrap();

    let gold = db.memberships().get_by_name("Gold").await.unwrap().unwrap();

    let customer = db
        .customers()
        .create(&NewCustomer {
            name: "Siti Rahayu".to_string(),
            nik: "3171010101920002".to_string(),
            phone_number: "081300000002".to_string(),
            membership_id: None,
        })
        .await
        .unwrap();
    let member = db
        .customers()
        .create(&NewCustomer {
            name: "Budi Santoso".to_string(),
            nik: "3171010101900001".to_string(),
            phone_number: "081300000001".to_string(),
            membership_id: Some(gold.id),
        })
        .await
        .unwrap();
    let car = db
        .cars()
        .create(&NewCar {
            name: "Toyota Avanza".to_string(),
            stock,
            daily_rent_cents: Money::from_major(100_000).cents(),
        })
        .await
        .unwrap();
    let driver = db
        .drivers()
        .create(&NewDriver {
            name: "Joko Susilo".to_string(),
            nik: "3174010101800001".to_string(),
            phone_number: "081211110001".to_string(),
            daily_cost_cents: Money::from_major(50_000).cents(),
        })
        .await
        .unwrap();

    (customer, member, car, driver)
}

pub(crate) async fn booking_type(db: &Database, label: &str) -> BookingType {
    db.booking_types().get_by_label(label).await.unwrap().unwrap()
}

/// Fresh in-memory store with one car of the given stock.
pub(crate) async fn fixture(stock: i64) -> Fixture {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let (customer, member, car, driver) = seed_catalog(&db, stock).await;
    let car_only = booking_type(&db, BOOKING_TYPE_CAR_ONLY).await;
    let car_and_driver = booking_type(&db, BOOKING_TYPE_CAR_AND_DRIVER).await;

    Fixture {
        lifecycle: BookingLifecycle::new(db.clone(), FixedClock(today())),
        guard: IntegrityGuard::new(db.clone()),
        memberships: MembershipManager::new(db.clone()),
        incentives: IncentiveLedger::new(db.clone()),
        db,
        customer,
        member,
        car,
        driver,
        car_only,
        car_and_driver,
    }
}
