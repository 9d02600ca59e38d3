//! Customer service - registration and profile management

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{normalize_email, Customer, CustomerKey, CustomerUpdate, NewCustomer};
use crate::ports::Repository;

pub struct CustomerService {
    repository: Arc<dyn Repository>,
}

impl CustomerService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Register a new customer
    ///
    /// Username, email and CIF number must each be unused; the first clash
    /// found is reported as `Conflict`.
    pub fn register(&self, mut new: NewCustomer) -> Result<Customer> {
        new.validate()?;

        for (field, key) in [
            ("username", CustomerKey::Username(new.username.clone())),
            ("email", CustomerKey::Email(new.email.clone())),
            ("CIF number", CustomerKey::Cif(new.cif_number.clone())),
        ] {
            if self.repository.find_customer(&key)?.is_some() {
                return Err(Error::conflict(format!(
                    "{} already registered: {}",
                    field, key
                )));
            }
        }

        let customer = self.repository.insert_customer(&new)?;
        tracing::info!(customer_id = customer.id, "customer registered");
        Ok(customer)
    }

    pub fn get(&self, id: i64) -> Result<Customer> {
        self.find(&CustomerKey::Id(id))
    }

    pub fn get_by_username(&self, username: &str) -> Result<Customer> {
        self.find(&CustomerKey::Username(username.trim().to_string()))
    }

    pub fn get_by_email(&self, email: &str) -> Result<Customer> {
        self.find(&CustomerKey::Email(normalize_email(email)?))
    }

    /// Customers ordered by id
    pub fn list(&self, skip: usize, limit: usize) -> Result<Vec<Customer>> {
        if limit == 0 {
            return Err(Error::invalid_argument("limit must be at least 1"));
        }
        self.repository.list_customers(skip, limit)
    }

    /// Change profile fields (name, email, phone)
    pub fn update(&self, id: i64, mut update: CustomerUpdate) -> Result<Customer> {
        update.validate()?;
        if update.is_empty() {
            return self.get(id);
        }

        if let Some(email) = &update.email {
            if let Some(owner) = self
                .repository
                .find_customer(&CustomerKey::Email(email.clone()))?
            {
                if owner.id != id {
                    return Err(Error::conflict(format!(
                        "email {} belongs to another customer",
                        email
                    )));
                }
            }
        }

        let customer = self
            .repository
            .update_customer(id, &mut |customer| {
                update.apply(customer);
                Ok(())
            })?
            .ok_or_else(|| Error::not_found(format!("customer id {}", id)))?;
        tracing::debug!(customer_id = id, "customer profile updated");
        Ok(customer)
    }

    fn find(&self, key: &CustomerKey) -> Result<Customer> {
        self.repository
            .find_customer(key)?
            .ok_or_else(|| Error::not_found(key.to_string()))
    }
}
