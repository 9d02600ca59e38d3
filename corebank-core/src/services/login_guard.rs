//! Login guard - consecutive-failure lockout
//!
//! The guard never sees credentials. Callers verify them elsewhere and
//! report the outcome here; the guard keeps the counter and the lock flag.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::result::{Error, Result};
use crate::domain::{Customer, CustomerKey, LoginAttempt, LOCK_THRESHOLD};
use crate::ports::Repository;

pub struct LoginGuard {
    repository: Arc<dyn Repository>,
    threshold: u32,
}

impl LoginGuard {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self {
            repository,
            threshold: LOCK_THRESHOLD,
        }
    }

    /// Use a custom lock threshold (at least 1)
    pub fn with_threshold(repository: Arc<dyn Repository>, threshold: u32) -> Result<Self> {
        if threshold == 0 {
            return Err(Error::invalid_argument("lock threshold must be at least 1"));
        }
        Ok(Self {
            repository,
            threshold,
        })
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Count one failed credential check; locks on reaching the threshold
    pub fn record_failure(&self, customer_id: i64) -> Result<LoginAttempt> {
        let threshold = self.threshold;
        let customer = self.mutate(customer_id, &mut |customer| {
            customer.register_failed_login(threshold);
            Ok(())
        })?;

        let attempt = LoginAttempt::from(&customer);
        if attempt.is_locked {
            tracing::warn!(
                customer_id,
                attempts = attempt.failed_login_attempts,
                "customer locked after failed logins"
            );
        } else {
            tracing::debug!(
                customer_id,
                attempts = attempt.failed_login_attempts,
                "failed login recorded"
            );
        }
        Ok(attempt)
    }

    /// Reset the counter after a valid credential check
    ///
    /// A locked customer stays locked; only `unlock` clears the flag.
    pub fn record_success(&self, customer_id: i64) -> Result<Customer> {
        let now = Utc::now();
        let customer = self.mutate(customer_id, &mut |customer| {
            customer.register_successful_login(now);
            Ok(())
        })?;
        if customer.is_locked {
            tracing::warn!(customer_id, "successful login on a locked customer");
        } else {
            tracing::debug!(customer_id, "successful login recorded");
        }
        Ok(customer)
    }

    /// Unknown customers report `false`; callers wanting an existence check
    /// must look the customer up separately.
    pub fn is_locked(&self, customer_id: i64) -> Result<bool> {
        Ok(self
            .repository
            .find_customer(&CustomerKey::Id(customer_id))?
            .is_some_and(|customer| customer.is_locked))
    }

    pub fn unlock(&self, customer_id: i64) -> Result<Customer> {
        let customer = self.mutate(customer_id, &mut |customer| {
            customer.unlock();
            Ok(())
        })?;
        tracing::info!(customer_id, "customer unlocked");
        Ok(customer)
    }

    fn mutate(
        &self,
        customer_id: i64,
        mutation: &mut dyn FnMut(&mut Customer) -> Result<()>,
    ) -> Result<Customer> {
        self.repository
            .update_customer(customer_id, mutation)?
            .ok_or_else(|| Error::not_found(format!("customer id {}", customer_id)))
    }
}
