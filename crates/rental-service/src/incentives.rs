//! # Driver Incentives
//!
//! Read side of the incentives written when bookings with a driver finish.

use rental_core::IncentiveSummary;
use rental_db::Database;

use crate::error::{ServiceError, ServiceResult};

/// Per-driver incentive summaries.
#[derive(Debug, Clone)]
pub struct IncentiveLedger {
    db: Database,
}

impl IncentiveLedger {
    pub fn new(db: Database) -> Self {
        IncentiveLedger { db }
    }

    /// Every live incentive accrued by a driver, with the total.
    ///
    /// Soft-deleted drivers still have their history listed.
    pub async fn driver_incentives(&self, driver_id: &str) -> ServiceResult<IncentiveSummary> {
        if self.db.drivers().get_any(driver_id).await?.is_none() {
            return Err(ServiceError::not_found("Driver", driver_id));
        }

        let incentives = self.db.incentives().list_for_driver(driver_id).await?;
        Ok(IncentiveSummary::new(driver_id, incentives))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{date, fixture};
    use rental_core::NewBooking;

    #[tokio::test]
    async fn test_summary_totals_finished_bookings() {
        let fx = fixture(2).await;
        let input = NewBooking {
            customer_id: fx.customer.id.clone(),
            car_id: fx.car.id.clone(),
            booking_type_id: fx.car_and_driver.id.clone(),
            driver_id: Some(fx.driver.id.clone()),
            start_rent: date(2024, 1, 10),
            end_rent: date(2024, 1, 12),
        };
        let three_days = fx.lifecycle.create_booking(&input).await.unwrap();
        let one_day = fx
            .lifecycle
            .create_booking(&NewBooking {
                end_rent: date(2024, 1, 10),
                ..input.clone()
            })
            .await
            .unwrap();
        let unfinished = fx.lifecycle.create_booking(&input).await;
        assert!(unfinished.is_err()); // stock exhausted

        fx.lifecycle.finish_booking(&three_days.booking.id).await.unwrap();
        fx.lifecycle.finish_booking(&one_day.booking.id).await.unwrap();
        fx.guard.delete_driver(&fx.driver.id).await.unwrap();

        let summary = fx.incentives.driver_incentives(&fx.driver.id).await.unwrap();
        assert_eq!(summary.incentives.len(), 2);
        assert_eq!(summary.total_incentive_cents, 1_500_000 + 500_000);
    }

    #[tokio::test]
    async fn test_unknown_driver() {
        let fx = fixture(1).await;
        let err = fx.incentives.driver_incentives("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
