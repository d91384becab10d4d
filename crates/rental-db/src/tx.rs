//! # Scoped Store Transactions
//!
//! [`StoreTx`] is the unit of atomicity for every booking operation.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        StoreTx Lifecycle                                │
//! │                                                                         │
//! │  db.begin()  ──►  BEGIN IMMEDIATE   (write lock taken up front)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  reads + writes through the same connection                            │
//! │       │                                                                 │
//! │       ├── commit()  ──►  COMMIT     (all effects visible at once)      │
//! │       │                                                                 │
//! │       └── dropped / `?` early return  ──►  ROLLBACK                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Taking the write lock at `BEGIN` serializes writers, so a stock check and
//! the stock update that follows it can never interleave with another
//! booking. Waiting writers are bounded by the connection's busy timeout.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{booking, booking_type, car, customer, driver, incentive, membership};
use rental_core::{
    Booking, BookingDetails, BookingType, Car, ConstraintInfo, Customer, Driver, DriverIncentive,
    EntityKind, Membership,
};

/// An open write transaction on the entity store.
///
/// Rolls back on drop unless [`StoreTx::commit`] was called.
pub struct StoreTx {
    tx: Transaction<'static, Sqlite>,
}

impl StoreTx {
    pub(crate) async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool.begin_with("BEGIN IMMEDIATE").await?;
        debug!("Transaction started");
        Ok(StoreTx { tx })
    }

    /// Commits every effect of this transaction.
    pub async fn commit(self) -> DbResult<()> {
        self.tx.commit().await?;
        debug!("Transaction committed");
        Ok(())
    }

    fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Customer, unless deleted.
    pub async fn active_customer(&mut self, id: &str) -> DbResult<Option<Customer>> {
        customer::fetch_active(self.conn(), id).await
    }

    /// Car, unless soft-deleted.
    pub async fn active_car(&mut self, id: &str) -> DbResult<Option<Car>> {
        car::fetch_active(self.conn(), id).await
    }

    /// Car, including soft-deleted ones.
    pub async fn any_car(&mut self, id: &str) -> DbResult<Option<Car>> {
        car::fetch_any(self.conn(), id).await
    }

    /// Driver, unless soft-deleted.
    pub async fn active_driver(&mut self, id: &str) -> DbResult<Option<Driver>> {
        driver::fetch_active(self.conn(), id).await
    }

    /// Driver, including soft-deleted ones.
    pub async fn any_driver(&mut self, id: &str) -> DbResult<Option<Driver>> {
        driver::fetch_any(self.conn(), id).await
    }

    pub async fn booking_type(&mut self, id: &str) -> DbResult<Option<BookingType>> {
        booking_type::fetch(self.conn(), id).await
    }

    pub async fn booking_type_by_label(&mut self, label: &str) -> DbResult<Option<BookingType>> {
        booking_type::fetch_by_label(self.conn(), label).await
    }

    pub async fn membership(&mut self, id: &str) -> DbResult<Option<Membership>> {
        membership::fetch(self.conn(), id).await
    }

    pub async fn membership_by_name(&mut self, name: &str) -> DbResult<Option<Membership>> {
        membership::fetch_by_name(self.conn(), name).await
    }

    pub async fn booking(&mut self, id: &str) -> DbResult<Option<Booking>> {
        booking::fetch(self.conn(), id).await
    }

    /// Joins a booking with its customer, membership, car, driver and type.
    pub async fn booking_details(&mut self, booking: Booking) -> DbResult<BookingDetails> {
        booking::load_details(self.conn(), booking).await
    }

    /// Total and unfinished bookings referencing an entity.
    pub async fn count_bookings(&mut self, kind: EntityKind, id: &str) -> DbResult<ConstraintInfo> {
        booking::count_for(self.conn(), kind, id).await
    }

    // =========================================================================
    // Booking Writes
    // =========================================================================

    pub async fn insert_booking(&mut self, booking: &Booking) -> DbResult<()> {
        booking::insert(self.conn(), booking).await
    }

    /// Writes dates and costs. Returns `false` if the booking is gone or
    /// already finished.
    pub async fn update_booking_terms(&mut self, booking: &Booking) -> DbResult<bool> {
        Ok(booking::update_terms(self.conn(), booking).await? == 1)
    }

    /// Returns `false` if the booking is gone or already finished.
    pub async fn mark_booking_finished(&mut self, id: &str, at: DateTime<Utc>) -> DbResult<bool> {
        Ok(booking::mark_finished(self.conn(), id, at).await? == 1)
    }

    /// Returns `false` if the booking is gone or already finished.
    pub async fn delete_unfinished_booking(&mut self, id: &str) -> DbResult<bool> {
        Ok(booking::delete_unfinished(self.conn(), id).await? == 1)
    }

    pub async fn insert_incentive(&mut self, incentive: &DriverIncentive) -> DbResult<()> {
        incentive::insert(self.conn(), incentive).await
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// Takes one unit of a car. `None` when no unit is left.
    pub async fn reserve_car_unit(&mut self, car_id: &str) -> DbResult<Option<i64>> {
        car::reserve_unit(self.conn(), car_id).await
    }

    /// Returns one unit of a car. `None` if the car row is missing.
    pub async fn release_car_unit(&mut self, car_id: &str) -> DbResult<Option<i64>> {
        car::release_unit(self.conn(), car_id).await
    }

    // =========================================================================
    // Catalog Writes
    // =========================================================================

    pub async fn soft_delete_car(&mut self, id: &str, at: DateTime<Utc>) -> DbResult<bool> {
        Ok(car::soft_delete(self.conn(), id, at).await? == 1)
    }

    pub async fn soft_delete_driver(&mut self, id: &str, at: DateTime<Utc>) -> DbResult<bool> {
        Ok(driver::soft_delete(self.conn(), id, at).await? == 1)
    }

    pub async fn hard_delete_customer(&mut self, id: &str) -> DbResult<bool> {
        Ok(customer::hard_delete(self.conn(), id).await? == 1)
    }

    /// Sets or clears a customer's membership.
    pub async fn set_customer_membership(
        &mut self,
        customer_id: &str,
        membership_id: Option<&str>,
    ) -> DbResult<bool> {
        Ok(customer::set_membership(self.conn(), customer_id, membership_id).await? == 1)
    }

    pub async fn insert_membership(&mut self, membership: &Membership) -> DbResult<()> {
        membership::insert(self.conn(), membership).await
    }

    pub async fn insert_booking_type(&mut self, booking_type: &BookingType) -> DbResult<()> {
        booking_type::insert(self.conn(), booking_type).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::generate_id;
    use crate::seed::seed_defaults;
    use chrono::NaiveDate;
    use rental_core::{NewCar, NewCustomer, BOOKING_TYPE_CAR_ONLY};

    async fn setup() -> (Database, Customer, Car, BookingType) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_defaults(&db).await.unwrap();

        let customer = db
            .customers()
            .create(&NewCustomer {
                name: "Budi Santoso".to_string(),
                nik: "3171010101900001".to_string(),
                phone_number: "081300000001".to_string(),
                membership_id: None,
            })
            .await
            .unwrap();
        let car = db
            .cars()
            .create(&NewCar {
                name: "Toyota Avanza".to_string(),
                stock: 1,
                daily_rent_cents: 10_000_000,
            })
            .await
            .unwrap();
        let car_only = db
            .booking_types()
            .get_by_label(BOOKING_TYPE_CAR_ONLY)
            .await
            .unwrap()
            .unwrap();

        (db, customer, car, car_only)
    }

    fn booking_for(customer: &Customer, car: &Car, booking_type: &BookingType) -> Booking {
        let now = Utc::now();
        Booking {
            id: generate_id(),
            customer_id: customer.id.clone(),
            car_id: car.id.clone(),
            booking_type_id: booking_type.id.clone(),
            driver_id: None,
            start_rent: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
            end_rent: NaiveDate::from_ymd_opt(2030, 1, 12).unwrap(),
            finished: false,
            total_cost_cents: 30_000_000,
            discount_cents: 0,
            total_driver_cost_cents: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_reserve_stops_at_zero() {
        let (db, _, car, _) = setup().await;

        let mut tx = db.begin().await.unwrap();
        assert_eq!(tx.reserve_car_unit(&car.id).await.unwrap(), Some(0));
        assert_eq!(tx.reserve_car_unit(&car.id).await.unwrap(), None);
        assert_eq!(tx.release_car_unit(&car.id).await.unwrap(), Some(1));
        tx.commit().await.unwrap();

        assert_eq!(db.cars().get_by_id(&car.id).await.unwrap().unwrap().stock, 1);
    }

    #[tokio::test]
    async fn test_uncommitted_writes_roll_back_on_drop() {
        let (db, customer, car, car_only) = setup().await;
        let booking = booking_for(&customer, &car, &car_only);

        {
            let mut tx = db.begin().await.unwrap();
            assert_eq!(tx.reserve_car_unit(&car.id).await.unwrap(), Some(0));
            tx.insert_booking(&booking).await.unwrap();
            // dropped without commit
        }

        assert_eq!(db.cars().get_by_id(&car.id).await.unwrap().unwrap().stock, 1);
        assert!(db.bookings().get_by_id(&booking.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_statement_discards_earlier_writes() {
        let (db, customer, car, car_only) = setup().await;
        let booking = booking_for(&customer, &car, &car_only);

        let outcome: DbResult<()> = async {
            let mut tx = db.begin().await?;
            tx.reserve_car_unit(&car.id).await?;
            tx.insert_booking(&booking).await?;
            // same primary key again
            tx.insert_booking(&booking).await?;
            tx.commit().await
        }
        .await;

        let err = outcome.unwrap_err();
        assert!(err.to_string().contains("bookings.id"), "{err}");
        assert_eq!(db.cars().get_by_id(&car.id).await.unwrap().unwrap().stock, 1);
        assert!(db.bookings().get_by_id(&booking.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_finished_booking_rejects_further_writes() {
        let (db, customer, car, car_only) = setup().await;
        let booking = booking_for(&customer, &car, &car_only);

        let mut tx = db.begin().await.unwrap();
        tx.insert_booking(&booking).await.unwrap();
        assert!(tx.mark_booking_finished(&booking.id, Utc::now()).await.unwrap());

        assert!(!tx.mark_booking_finished(&booking.id, Utc::now()).await.unwrap());
        assert!(!tx.update_booking_terms(&booking).await.unwrap());
        assert!(!tx.delete_unfinished_booking(&booking.id).await.unwrap());
        tx.commit().await.unwrap();

        let stored = db.bookings().get_by_id(&booking.id).await.unwrap().unwrap();
        assert!(stored.finished);
    }

    #[tokio::test]
    async fn test_count_bookings_splits_active() {
        let (db, customer, car, car_only) = setup().await;
        let first = booking_for(&customer, &car, &car_only);
        let second = booking_for(&customer, &car, &car_only);

        let mut tx = db.begin().await.unwrap();
        tx.insert_booking(&first).await.unwrap();
        tx.insert_booking(&second).await.unwrap();
        tx.mark_booking_finished(&first.id, Utc::now()).await.unwrap();

        let info = tx.count_bookings(EntityKind::Car, &car.id).await.unwrap();
        assert_eq!(info.total_bookings, 2);
        assert_eq!(info.active_bookings, 1);

        let none = tx.count_bookings(EntityKind::Driver, "missing").await.unwrap();
        assert_eq!(none, ConstraintInfo::default());
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_details_include_soft_deleted_car() {
        let (db, customer, car, car_only) = setup().await;
        let booking = booking_for(&customer, &car, &car_only);

        let mut tx = db.begin().await.unwrap();
        tx.insert_booking(&booking).await.unwrap();
        assert!(tx.soft_delete_car(&car.id, Utc::now()).await.unwrap());
        assert!(tx.active_car(&car.id).await.unwrap().is_none());

        let details = tx.booking_details(booking.clone()).await.unwrap();
        assert_eq!(details.car.id, car.id);
        assert!(details.car.deleted_at.is_some());
        assert_eq!(details.booking_type.label, BOOKING_TYPE_CAR_ONLY);
        assert!(details.customer.membership.is_none());
        tx.commit().await.unwrap();
    }
}
