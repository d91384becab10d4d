//! # Booking Lifecycle
//!
//! Create, update, finish and delete bookings.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Booking Lifecycle                                │
//! │                                                                         │
//! │   create ──► ┌──────────┐ ──── finish ────► ┌──────────┐               │
//! │              │  ACTIVE  │                   │ FINISHED │  (read-only)  │
//! │   update ──► │finished=0│                   │finished=1│               │
//! │              └────┬─────┘                   └──────────┘               │
//! │                   │ delete                                              │
//! │                   ▼                                                     │
//! │               (removed)                                                 │
//! │                                                                         │
//! │  Stock effects:  create −1 · finish +1 · delete +1 · update 0           │
//! │  finish with a driver also writes one DriverIncentive                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation runs in one [`StoreTx`]: reads used for validation and
//! pricing, then all writes, then commit. An error anywhere drops the
//! transaction and nothing is applied.

use chrono::Utc;
use tracing::{info, warn};

use rental_core::pricing::{self, PricingInput};
use rental_core::validation::{validate_driver_pairing, validate_start_not_in_past};
use rental_core::{
    Booking, BookingDetails, BookingPatch, Car, ConstraintViolation, CoreError,
    DeleteConfirmation, Driver, DriverIncentive, Membership, NewBooking, Quote, RentalPeriod,
};
use rental_db::repository::generate_id;
use rental_db::{Database, StoreTx};

use crate::clock::{Clock, SystemClock};
use crate::error::{ServiceError, ServiceResult};

/// Booking lifecycle manager.
#[derive(Debug, Clone)]
pub struct BookingLifecycle<C: Clock = SystemClock> {
    db: Database,
    clock: C,
}

impl BookingLifecycle<SystemClock> {
    /// Lifecycle manager using the current UTC day.
    pub fn with_system_clock(db: Database) -> Self {
        BookingLifecycle::new(db, SystemClock)
    }
}

impl<C: Clock> BookingLifecycle<C> {
    pub fn new(db: Database, clock: C) -> Self {
        BookingLifecycle { db, clock }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates a booking and takes one unit of the car.
    ///
    /// ## Checks (in order)
    /// 1. customer, car, booking type exist → `NOT_FOUND`
    /// 2. car has stock → `CONFLICT`
    /// 3. `start <= end`, start not before today → `INVALID_ARGUMENT`
    /// 4. driver given iff type is "Car & Driver" → `INVALID_ARGUMENT`
    /// 5. driver exists → `NOT_FOUND`
    pub async fn create_booking(&self, input: &NewBooking) -> ServiceResult<BookingDetails> {
        let mut tx = self.db.begin().await?;

        let customer = tx
            .active_customer(&input.customer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Customer", &input.customer_id))?;

        let car = tx
            .active_car(&input.car_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Car", &input.car_id))?;

        let booking_type = tx
            .booking_type(&input.booking_type_id)
            .await?
            .ok_or_else(|| CoreError::not_found("BookingType", &input.booking_type_id))?;

        if !car.is_available() {
            warn!(car_id = %car.id, stock = car.stock, "Booking rejected: car out of stock");
            return Err(CoreError::CarUnavailable { car_id: car.id }.into());
        }

        let period = RentalPeriod::new(input.start_rent, input.end_rent)?;
        validate_start_not_in_past(period.start(), self.clock.today())?;
        validate_driver_pairing(&booking_type, input.driver_id.as_deref())?;

        let driver = match input.driver_id.as_deref() {
            Some(driver_id) => Some(
                tx.active_driver(driver_id)
                    .await?
                    .ok_or_else(|| CoreError::not_found("Driver", driver_id))?,
            ),
            None => None,
        };

        let membership = match customer.membership_id.as_deref() {
            Some(membership_id) => tx.membership(membership_id).await?,
            None => None,
        };

        let quote = quote_booking(period, &car, membership.as_ref(), driver.as_ref())?;

        let remaining_stock = tx.reserve_car_unit(&car.id).await?.ok_or_else(|| {
            warn!(car_id = %car.id, "Booking rejected: last unit taken");
            CoreError::CarUnavailable {
                car_id: car.id.clone(),
            }
        })?;

        let now = Utc::now();
        let booking = Booking {
            id: generate_id(),
            customer_id: customer.id,
            car_id: car.id,
            booking_type_id: booking_type.id,
            driver_id: driver.map(|d| d.id),
            start_rent: period.start(),
            end_rent: period.end(),
            finished: false,
            total_cost_cents: quote.base_cost.cents(),
            discount_cents: quote.discount.cents(),
            total_driver_cost_cents: quote.driver_cost.cents(),
            created_at: now,
            updated_at: now,
        };
        tx.insert_booking(&booking).await?;

        let details = tx.booking_details(booking).await?;
        tx.commit().await?;

        info!(
            booking_id = %details.booking.id,
            car_id = %details.car.id,
            days = quote.days,
            total_cost_cents = details.booking.total_cost_cents,
            remaining_stock,
            "Booking created"
        );

        Ok(details)
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Applies a sparse patch to an unfinished booking.
    ///
    /// A patch touching either date is checked against the merged period
    /// and all three costs are recomputed from it, replacing any costs in
    /// the patch. Stock is never changed here.
    pub async fn update_booking(
        &self,
        booking_id: &str,
        patch: &BookingPatch,
    ) -> ServiceResult<BookingDetails> {
        let mut tx = self.db.begin().await?;

        let mut booking = tx
            .booking(booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Booking", booking_id))?;

        if booking.finished {
            warn!(booking_id = %booking_id, "Update rejected: booking finished");
            return Err(finished_error(booking_id, "update"));
        }

        patch.validate()?;

        if patch.is_empty() {
            let details = tx.booking_details(booking).await?;
            tx.commit().await?;
            return Ok(details);
        }

        let repriced = if patch.touches_dates() {
            let (start, end) = patch.merged_dates(&booking);
            let period = RentalPeriod::new(start, end)?;
            validate_start_not_in_past(period.start(), self.clock.today())?;
            Some(period)
        } else {
            None
        };

        patch.apply_to(&mut booking);

        if let Some(period) = repriced {
            let quote = requote(&mut tx, &booking, period).await?;
            booking.total_cost_cents = quote.base_cost.cents();
            booking.discount_cents = quote.discount.cents();
            booking.total_driver_cost_cents = quote.driver_cost.cents();
        }

        booking.updated_at = Utc::now();
        if !tx.update_booking_terms(&booking).await? {
            return Err(finished_error(booking_id, "update"));
        }

        let details = tx.booking_details(booking).await?;
        tx.commit().await?;

        info!(
            booking_id = %booking_id,
            start_rent = %details.booking.start_rent,
            end_rent = %details.booking.end_rent,
            total_cost_cents = details.booking.total_cost_cents,
            "Booking updated"
        );

        Ok(details)
    }

    // =========================================================================
    // Finish
    // =========================================================================

    /// Finishes a booking: returns the car unit and, with a driver, records
    /// the driver's incentive.
    pub async fn finish_booking(&self, booking_id: &str) -> ServiceResult<BookingDetails> {
        let mut tx = self.db.begin().await?;

        let booking = tx
            .booking(booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Booking", booking_id))?;

        if booking.finished {
            warn!(booking_id = %booking_id, "Finish rejected: booking already finished");
            return Err(finished_error(booking_id, "finish"));
        }

        let car = tx
            .any_car(&booking.car_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Car", &booking.car_id))?;

        let now = Utc::now();
        if !tx.mark_booking_finished(booking_id, now).await? {
            return Err(finished_error(booking_id, "finish"));
        }

        let restored_stock = tx
            .release_car_unit(&car.id)
            .await?
            .ok_or_else(|| CoreError::not_found("Car", &car.id))?;

        let incentive_cents = match booking.driver_id.as_deref() {
            Some(driver_id) => {
                let amount = pricing::driver_incentive(booking.period()?, car.daily_rent())?;
                let incentive = DriverIncentive {
                    id: generate_id(),
                    booking_id: booking.id.clone(),
                    incentive_cents: amount.cents(),
                    deleted_at: None,
                    created_at: now,
                };
                tx.insert_incentive(&incentive).await?;
                info!(
                    booking_id = %booking_id,
                    driver_id = %driver_id,
                    incentive_cents = incentive.incentive_cents,
                    "Driver incentive recorded"
                );
                incentive.incentive_cents
            }
            None => 0,
        };

        let finished = tx
            .booking(booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Booking", booking_id))?;
        let details = tx.booking_details(finished).await?;
        tx.commit().await?;

        info!(
            booking_id = %booking_id,
            car_id = %car.id,
            restored_stock,
            incentive_cents,
            "Booking finished"
        );

        Ok(details)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Deletes an unfinished booking and returns its car unit.
    ///
    /// Finished bookings are kept for history and cannot be deleted.
    pub async fn delete_booking(&self, booking_id: &str) -> ServiceResult<DeleteConfirmation> {
        let mut tx = self.db.begin().await?;

        let booking = tx
            .booking(booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Booking", booking_id))?;

        if booking.finished {
            warn!(booking_id = %booking_id, "Delete rejected: booking finished");
            return Err(ConstraintViolation::finished_booking(booking_id).into());
        }

        if !tx.delete_unfinished_booking(booking_id).await? {
            return Err(ConstraintViolation::finished_booking(booking_id).into());
        }

        let restored_car_stock = tx
            .release_car_unit(&booking.car_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Car", &booking.car_id))?;

        tx.commit().await?;

        info!(
            booking_id = %booking_id,
            car_id = %booking.car_id,
            restored_car_stock,
            "Booking deleted"
        );

        Ok(DeleteConfirmation {
            booking_id: booking.id,
            restored_car_stock,
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// One booking with everything it references.
    pub async fn get_booking(&self, booking_id: &str) -> ServiceResult<BookingDetails> {
        self.db
            .bookings()
            .get_details(booking_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking", booking_id))
    }

    /// All bookings, oldest first.
    pub async fn list_bookings(&self) -> ServiceResult<Vec<BookingDetails>> {
        Ok(self.db.bookings().list_details().await?)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn finished_error(booking_id: &str, operation: &'static str) -> ServiceError {
    CoreError::BookingFinished {
        booking_id: booking_id.to_string(),
        operation,
    }
    .into()
}

fn quote_booking(
    period: RentalPeriod,
    car: &Car,
    membership: Option<&Membership>,
    driver: Option<&Driver>,
) -> ServiceResult<Quote> {
    let quote = pricing::quote(&PricingInput {
        period,
        daily_rent: car.daily_rent(),
        membership_discount: membership.map(Membership::discount_rate),
        driver_daily_cost: driver.map(Driver::daily_cost),
    })?;
    Ok(quote)
}

/// Prices `booking` again over `period` with its current car, customer
/// membership and driver.
async fn requote(tx: &mut StoreTx, booking: &Booking, period: RentalPeriod) -> ServiceResult<Quote> {
    let car = tx
        .any_car(&booking.car_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Car", &booking.car_id))?;

    let customer = tx
        .active_customer(&booking.customer_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Customer", &booking.customer_id))?;

    let membership = match customer.membership_id.as_deref() {
        Some(membership_id) => tx.membership(membership_id).await?,
        None => None,
    };

    let driver = match booking.driver_id.as_deref() {
        Some(driver_id) => Some(
            tx.any_driver(driver_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Driver", driver_id))?,
        ),
        None => None,
    };

    quote_booking(period, &car, membership.as_ref(), driver.as_ref())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{date, fixture, Fixture};
    use chrono::NaiveDate;
    use rental_core::{ConstraintKind, Patch};

    fn car_only(fx: &Fixture, start: (i32, u32, u32), end: (i32, u32, u32)) -> NewBooking {
        NewBooking {
            customer_id: fx.customer.id.clone(),
            car_id: fx.car.id.clone(),
            booking_type_id: fx.car_only.id.clone(),
            driver_id: None,
            start_rent: date(start.0, start.1, start.2),
            end_rent: date(end.0, end.1, end.2),
        }
    }

    fn with_driver(fx: &Fixture) -> NewBooking {
        NewBooking {
            booking_type_id: fx.car_and_driver.id.clone(),
            driver_id: Some(fx.driver.id.clone()),
            ..car_only(fx, (2024, 1, 10), (2024, 1, 12))
        }
    }

    fn terms(b: &Booking) -> (NaiveDate, NaiveDate, i64, i64, i64, bool) {
        (
            b.start_rent,
            b.end_rent,
            b.total_cost_cents,
            b.discount_cents,
            b.total_driver_cost_cents,
            b.finished,
        )
    }

    async fn stock(fx: &Fixture) -> i64 {
        fx.db.cars().get_any(&fx.car.id).await.unwrap().unwrap().stock
    }

    /// Makes every insert into `table` fail until the trigger is dropped.
    async fn fail_inserts_into(fx: &Fixture, table: &str) {
        let sql = format!(
            "CREATE TRIGGER fail_{table} BEFORE INSERT ON {table} \
             BEGIN SELECT RAISE(ABORT, '{table} unavailable'); END"
        );
        sqlx::query(&sql).execute(fx.db.pool()).await.unwrap();
    }

    async fn allow_inserts_into(fx: &Fixture, table: &str) {
        let sql = format!("DROP TRIGGER fail_{table}");
        sqlx::query(&sql).execute(fx.db.pool()).await.unwrap();
    }

    // -------------------------------------------------------------------------
    // Create
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_three_day_booking_without_membership() {
        let fx = fixture(2).await;

        let details = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 10), (2024, 1, 12)))
            .await
            .unwrap();

        assert_eq!(details.booking.total_cost_cents, 30_000_000);
        assert_eq!(details.booking.discount_cents, 0);
        assert_eq!(details.booking.total_driver_cost_cents, 0);
        assert!(!details.booking.finished);
        assert!(details.driver.is_none());
        assert_eq!(details.customer.customer.id, fx.customer.id);
        assert_eq!(stock(&fx).await, 1);
    }

    #[tokio::test]
    async fn test_create_single_day_costs_one_rate() {
        let fx = fixture(1).await;

        let details = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 10), (2024, 1, 10)))
            .await
            .unwrap();

        assert_eq!(details.booking.total_cost_cents, 10_000_000);
    }

    #[tokio::test]
    async fn test_create_with_driver_and_membership() {
        let fx = fixture(1).await;
        let input = NewBooking {
            customer_id: fx.member.id.clone(),
            ..with_driver(&fx)
        };

        let details = fx.lifecycle.create_booking(&input).await.unwrap();

        assert_eq!(details.booking.total_cost_cents, 30_000_000);
        // Gold: 15% of the base cost
        assert_eq!(details.booking.discount_cents, 4_500_000);
        assert_eq!(details.booking.total_driver_cost_cents, 15_000_000);
        assert_eq!(details.driver.unwrap().id, fx.driver.id);
        assert_eq!(details.customer.membership.unwrap().name, "Gold");
    }

    #[tokio::test]
    async fn test_create_out_of_stock_conflicts_and_keeps_stock() {
        let fx = fixture(0).await;

        let err = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 10), (2024, 1, 12)))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(stock(&fx).await, 0);
        assert!(fx.lifecycle.list_bookings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_dates() {
        let fx = fixture(1).await;

        let backwards = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 12), (2024, 1, 10)))
            .await
            .unwrap_err();
        assert_eq!(backwards.code, ErrorCode::InvalidArgument);

        // Clock is fixed on 2024-01-01
        let past = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2023, 12, 31), (2024, 1, 2)))
            .await
            .unwrap_err();
        assert_eq!(past.code, ErrorCode::InvalidArgument);

        let today = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 1), (2024, 1, 1)))
            .await;
        assert!(today.is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_driver_pairing() {
        let fx = fixture(2).await;

        let not_allowed = NewBooking {
            driver_id: Some(fx.driver.id.clone()),
            ..car_only(&fx, (2024, 1, 10), (2024, 1, 12))
        };
        let err = fx.lifecycle.create_booking(&not_allowed).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);

        let required = NewBooking {
            driver_id: None,
            ..with_driver(&fx)
        };
        let err2 = fx.lifecycle.create_booking(&required).await.unwrap_err();
        assert_eq!(err2.code, ErrorCode::InvalidArgument);
        assert_ne!(err.message, err2.message);

        assert_eq!(stock(&fx).await, 2);
    }

    #[tokio::test]
    async fn test_create_failing_after_reservation_leaves_stock() {
        let fx = fixture(1).await;
        fail_inserts_into(&fx, "bookings").await;

        // the unit is reserved before the booking row is written
        let err = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 10), (2024, 1, 12)))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(stock(&fx).await, 1);
        assert!(fx.lifecycle.list_bookings().await.unwrap().is_empty());

        allow_inserts_into(&fx, "bookings").await;
        fx.lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 10), (2024, 1, 12)))
            .await
            .unwrap();
        assert_eq!(stock(&fx).await, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_overlong_or_overpriced_rental() {
        let fx = fixture(1).await;

        let err = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 10), (2040, 1, 10)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
        assert!(err.message.contains("rental_days"), "{}", err.message);

        // stored without validation, too expensive to price over a year
        let limousine = fx
            .db
            .cars()
            .create(&rental_core::NewCar {
                name: "Limousine".to_string(),
                stock: 1,
                daily_rent_cents: i64::MAX / 100,
            })
            .await
            .unwrap();
        let input = NewBooking {
            car_id: limousine.id.clone(),
            ..car_only(&fx, (2024, 1, 10), (2024, 12, 31))
        };
        let err = fx.lifecycle.create_booking(&input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);

        let limousine = fx.db.cars().get_by_id(&limousine.id).await.unwrap().unwrap();
        assert_eq!(limousine.stock, 1);
        assert_eq!(stock(&fx).await, 1);
    }

    #[tokio::test]
    async fn test_create_missing_references() {
        let fx = fixture(1).await;

        let input = NewBooking {
            car_id: "missing-car".to_string(),
            ..car_only(&fx, (2024, 1, 10), (2024, 1, 12))
        };
        let err = fx.lifecycle.create_booking(&input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let input = NewBooking {
            driver_id: Some("missing-driver".to_string()),
            ..with_driver(&fx)
        };
        let err = fx.lifecycle.create_booking(&input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(err.message.contains("missing-driver"));

        assert_eq!(stock(&fx).await, 1);
    }

    // -------------------------------------------------------------------------
    // Update
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_update_dates_recomputes_costs() {
        let fx = fixture(1).await;
        let input = NewBooking {
            customer_id: fx.member.id.clone(),
            ..with_driver(&fx)
        };
        let created = fx.lifecycle.create_booking(&input).await.unwrap();

        let patch = BookingPatch {
            end_rent: Patch::Set(date(2024, 1, 14)),
            // superseded by the recomputation
            total_cost_cents: Patch::Set(1),
            ..Default::default()
        };
        let updated = fx
            .lifecycle
            .update_booking(&created.booking.id, &patch)
            .await
            .unwrap();

        assert_eq!(updated.booking.start_rent, date(2024, 1, 10));
        assert_eq!(updated.booking.end_rent, date(2024, 1, 14));
        assert_eq!(updated.booking.total_cost_cents, 50_000_000);
        assert_eq!(updated.booking.discount_cents, 7_500_000);
        assert_eq!(updated.booking.total_driver_cost_cents, 25_000_000);
        // no stock change on update
        assert_eq!(stock(&fx).await, 0);
    }

    #[tokio::test]
    async fn test_update_costs_only_keeps_dates() {
        let fx = fixture(1).await;
        let created = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 10), (2024, 1, 12)))
            .await
            .unwrap();

        let patch = BookingPatch {
            discount_cents: Patch::Set(250_000),
            ..Default::default()
        };
        let updated = fx
            .lifecycle
            .update_booking(&created.booking.id, &patch)
            .await
            .unwrap();

        assert_eq!(updated.booking.discount_cents, 250_000);
        assert_eq!(updated.booking.total_cost_cents, 30_000_000);
        assert_eq!(updated.booking.end_rent, date(2024, 1, 12));
    }

    #[tokio::test]
    async fn test_update_empty_patch_is_noop() {
        let fx = fixture(1).await;
        let created = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 10), (2024, 1, 12)))
            .await
            .unwrap();

        let same = fx
            .lifecycle
            .update_booking(&created.booking.id, &BookingPatch::default())
            .await
            .unwrap();

        assert_eq!(terms(&same.booking), terms(&created.booking));
    }

    #[tokio::test]
    async fn test_update_rejects_merged_dates_out_of_order() {
        let fx = fixture(1).await;
        let created = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 10), (2024, 1, 12)))
            .await
            .unwrap();

        let patch = BookingPatch {
            start_rent: Patch::Set(date(2024, 1, 20)),
            ..Default::default()
        };
        let err = fx
            .lifecycle
            .update_booking(&created.booking.id, &patch)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);

        let patch = BookingPatch {
            total_cost_cents: Patch::Set(-1),
            ..Default::default()
        };
        let err = fx
            .lifecycle
            .update_booking(&created.booking.id, &patch)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);

        let stored = fx.lifecycle.get_booking(&created.booking.id).await.unwrap();
        assert_eq!(terms(&stored.booking), terms(&created.booking));
    }

    #[tokio::test]
    async fn test_update_missing_and_finished() {
        let fx = fixture(1).await;

        let err = fx
            .lifecycle
            .update_booking("missing", &BookingPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let created = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 10), (2024, 1, 12)))
            .await
            .unwrap();
        fx.lifecycle.finish_booking(&created.booking.id).await.unwrap();

        let err = fx
            .lifecycle
            .update_booking(&created.booking.id, &BookingPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FailedPrecondition);
    }

    // -------------------------------------------------------------------------
    // Finish
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_finish_without_driver_restores_stock_only() {
        let fx = fixture(1).await;
        let created = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 10), (2024, 1, 12)))
            .await
            .unwrap();
        assert_eq!(stock(&fx).await, 0);

        let finished = fx.lifecycle.finish_booking(&created.booking.id).await.unwrap();

        assert!(finished.booking.finished);
        assert_eq!(stock(&fx).await, 1);
        assert!(fx
            .db
            .incentives()
            .get_for_booking(&created.booking.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_finish_with_driver_records_incentive() {
        let fx = fixture(1).await;
        let input = NewBooking {
            customer_id: fx.member.id.clone(),
            ..with_driver(&fx)
        };
        let created = fx.lifecycle.create_booking(&input).await.unwrap();

        fx.lifecycle.finish_booking(&created.booking.id).await.unwrap();

        // 5% of 3 × 100,000.00, before the membership discount
        let incentives = fx.db.incentives().list_for_driver(&fx.driver.id).await.unwrap();
        assert_eq!(incentives.len(), 1);
        assert_eq!(incentives[0].booking_id, created.booking.id);
        assert_eq!(incentives[0].incentive_cents, 1_500_000);
        assert_eq!(stock(&fx).await, 1);
    }

    #[tokio::test]
    async fn test_finish_failing_after_release_keeps_booking_open() {
        let fx = fixture(1).await;
        let created = fx.lifecycle.create_booking(&with_driver(&fx)).await.unwrap();
        fail_inserts_into(&fx, "driver_incentives").await;

        // booking marked finished and unit released before the incentive insert
        let err = fx
            .lifecycle
            .finish_booking(&created.booking.id)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(stock(&fx).await, 0);
        let stored = fx.lifecycle.get_booking(&created.booking.id).await.unwrap();
        assert!(!stored.booking.finished);
        assert!(fx
            .db
            .incentives()
            .list_for_driver(&fx.driver.id)
            .await
            .unwrap()
            .is_empty());

        allow_inserts_into(&fx, "driver_incentives").await;
        let finished = fx.lifecycle.finish_booking(&created.booking.id).await.unwrap();
        assert!(finished.booking.finished);
        assert_eq!(stock(&fx).await, 1);
    }

    #[tokio::test]
    async fn test_double_finish_fails() {
        let fx = fixture(1).await;
        let created = fx.lifecycle.create_booking(&with_driver(&fx)).await.unwrap();

        fx.lifecycle.finish_booking(&created.booking.id).await.unwrap();
        let err = fx
            .lifecycle
            .finish_booking(&created.booking.id)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::FailedPrecondition);
        assert_eq!(stock(&fx).await, 1);
        let incentives = fx.db.incentives().list_for_driver(&fx.driver.id).await.unwrap();
        assert_eq!(incentives.len(), 1);
    }

    // -------------------------------------------------------------------------
    // Delete
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_delete_restores_stock_then_not_found() {
        let fx = fixture(2).await;
        let created = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 10), (2024, 1, 12)))
            .await
            .unwrap();
        assert_eq!(stock(&fx).await, 1);

        let confirmation = fx.lifecycle.delete_booking(&created.booking.id).await.unwrap();
        assert_eq!(confirmation.booking_id, created.booking.id);
        assert_eq!(confirmation.restored_car_stock, 2);
        assert_eq!(stock(&fx).await, 2);

        let err = fx
            .lifecycle
            .delete_booking(&created.booking.id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(stock(&fx).await, 2);
    }

    #[tokio::test]
    async fn test_delete_finished_booking_fails() {
        let fx = fixture(1).await;
        let created = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 10), (2024, 1, 12)))
            .await
            .unwrap();
        fx.lifecycle.finish_booking(&created.booking.id).await.unwrap();

        let err = fx
            .lifecycle
            .delete_booking(&created.booking.id)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::FailedPrecondition);
        let detail = err.detail.unwrap();
        assert_eq!(detail.constraint, ConstraintKind::FinishedBooking);
        assert_eq!(detail.entity_id, created.booking.id);
        assert_eq!(stock(&fx).await, 1);
        assert!(fx.lifecycle.get_booking(&created.booking.id).await.is_ok());
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_list_bookings_in_creation_order() {
        let fx = fixture(3).await;
        let first = fx
            .lifecycle
            .create_booking(&car_only(&fx, (2024, 1, 10), (2024, 1, 12)))
            .await
            .unwrap();
        let second = fx.lifecycle.create_booking(&with_driver(&fx)).await.unwrap();

        let all = fx.lifecycle.list_bookings().await.unwrap();
        let ids: Vec<_> = all.iter().map(|d| d.booking.id.clone()).collect();
        assert_eq!(ids, vec![first.booking.id, second.booking.id]);

        let err = fx.lifecycle.get_booking("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
