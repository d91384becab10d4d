//! # Membership Subscription
//!
//! Attaches a membership plan to a customer or removes it.
//!
//! Bookings keep the discount they were priced with. A changed plan is only
//! seen by later creates and date-changing updates.

use tracing::{info, warn};

use rental_core::{CoreError, Customer, CustomerDetails, Membership};
use rental_db::Database;

use crate::error::ServiceResult;

/// Membership subscription operations.
#[derive(Debug, Clone)]
pub struct MembershipManager {
    db: Database,
}

impl MembershipManager {
    pub fn new(db: Database) -> Self {
        MembershipManager { db }
    }

    /// All plans.
    pub async fn list_memberships(&self) -> ServiceResult<Vec<Membership>> {
        Ok(self.db.memberships().list().await?)
    }

    /// Subscribes a customer to a plan, replacing any current one.
    pub async fn subscribe_membership(
        &self,
        customer_id: &str,
        membership_id: &str,
    ) -> ServiceResult<CustomerDetails> {
        let mut tx = self.db.begin().await?;

        let customer = tx
            .active_customer(customer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Customer", customer_id))?;

        let membership = tx
            .membership(membership_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Membership", membership_id))?;

        if !tx
            .set_customer_membership(customer_id, Some(membership_id))
            .await?
        {
            return Err(CoreError::not_found("Customer", customer_id).into());
        }
        tx.commit().await?;

        info!(
            customer_id = %customer_id,
            membership = %membership.name,
            previous = ?customer.membership_id,
            "Customer subscribed"
        );

        Ok(CustomerDetails {
            customer: Customer {
                membership_id: Some(membership.id.clone()),
                ..customer
            },
            membership: Some(membership),
        })
    }

    /// Removes a customer's plan.
    pub async fn unsubscribe_membership(&self, customer_id: &str) -> ServiceResult<CustomerDetails> {
        let mut tx = self.db.begin().await?;

        let customer = tx
            .active_customer(customer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Customer", customer_id))?;

        if customer.membership_id.is_none() {
            warn!(customer_id = %customer_id, "Unsubscribe rejected: no membership");
            return Err(CoreError::NoMembership {
                customer_id: customer_id.to_string(),
            }
            .into());
        }

        if !tx.set_customer_membership(customer_id, None).await? {
            return Err(CoreError::not_found("Customer", customer_id).into());
        }
        tx.commit().await?;

        info!(customer_id = %customer_id, "Customer unsubscribed");

        Ok(CustomerDetails {
            customer: Customer {
                membership_id: None,
                ..customer
            },
            membership: None,
        })
    }
}
