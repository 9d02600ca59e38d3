//! Customer domain model

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Consecutive failed logins that lock a customer out
pub const LOCK_THRESHOLD: u32 = 3;

/// A bank customer and their login security state
///
/// Invariant: `is_locked` is true whenever `failed_login_attempts` has
/// reached the lock threshold. The converse does not hold: a lock is only
/// lifted by an explicit unlock, which also zeroes the counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub customer_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    /// Customer information file number, unique across the bank
    pub cif_number: String,
    pub failed_login_attempts: u32,
    pub is_locked: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Count one failed credential check, locking at `threshold`
    pub fn register_failed_login(&mut self, threshold: u32) {
        self.failed_login_attempts = self.failed_login_attempts.saturating_add(1);
        if self.failed_login_attempts >= threshold {
            self.is_locked = true;
        }
    }

    /// Reset the counter after a valid credential check. The lock stays.
    pub fn register_successful_login(&mut self, at: DateTime<Utc>) {
        self.failed_login_attempts = 0;
        self.last_login = Some(at);
    }

    pub fn unlock(&mut self) {
        self.is_locked = false;
        self.failed_login_attempts = 0;
    }
}

/// Outcome of recording a failed login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub customer_id: i64,
    pub failed_login_attempts: u32,
    pub is_locked: bool,
}

impl From<&Customer> for LoginAttempt {
    fn from(customer: &Customer) -> Self {
        Self {
            customer_id: customer.id,
            failed_login_attempts: customer.failed_login_attempts,
            is_locked: customer.is_locked,
        }
    }
}

/// Lookup key for a single customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerKey {
    Id(i64),
    Username(String),
    Email(String),
    Cif(String),
}

impl std::fmt::Display for CustomerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomerKey::Id(id) => write!(f, "customer id {}", id),
            CustomerKey::Username(username) => write!(f, "customer '{}'", username),
            CustomerKey::Email(email) => write!(f, "customer with email {}", email),
            CustomerKey::Cif(cif) => write!(f, "customer with CIF {}", cif),
        }
    }
}

/// Fields accepted at registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub customer_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub cif_number: String,
}

impl NewCustomer {
    /// Validate and normalize in place
    pub fn validate(&mut self) -> Result<()> {
        self.customer_name = validate_name(&self.customer_name)?;

        self.username = self.username.trim().to_string();
        let username_re =
            Regex::new(r"^[A-Za-z0-9_.]{3,50}$").map_err(|e| Error::Other(e.to_string()))?;
        if !username_re.is_match(&self.username) {
            return Err(Error::invalid_argument(
                "username must be 3-50 letters, digits, '_' or '.'",
            ));
        }

        self.email = normalize_email(&self.email)?;
        self.phone = validate_phone(&self.phone)?;

        self.cif_number = self.cif_number.trim().to_uppercase();
        if self.cif_number.is_empty() || self.cif_number.len() > 20 {
            return Err(Error::invalid_argument(
                "CIF number must be between 1 and 20 characters",
            ));
        }
        Ok(())
    }
}

/// Profile fields a customer update may change
///
/// Login counters, the lock flag and identity keys are not reachable from
/// here; they only move through the login guard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub customer_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CustomerUpdate {
    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none() && self.email.is_none() && self.phone.is_none()
    }

    /// Validate and normalize in place
    pub fn validate(&mut self) -> Result<()> {
        if let Some(name) = &self.customer_name {
            self.customer_name = Some(validate_name(name)?);
        }
        if let Some(email) = &self.email {
            self.email = Some(normalize_email(email)?);
        }
        if let Some(phone) = &self.phone {
            self.phone = Some(validate_phone(phone)?);
        }
        Ok(())
    }

    pub fn apply(&self, customer: &mut Customer) {
        if let Some(name) = &self.customer_name {
            customer.customer_name = name.clone();
        }
        if let Some(email) = &self.email {
            customer.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            customer.phone = phone.clone();
        }
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() || name.len() > 100 {
        return Err(Error::invalid_argument(
            "customer name must be between 1 and 100 characters",
        ));
    }
    Ok(name.to_string())
}

/// Lowercase and shape-check an email address
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let email_re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_err(|e| Error::Other(e.to_string()))?;
    if email.len() > 100 || !email_re.is_match(&email) {
        return Err(Error::invalid_argument(format!("invalid email: {}", email)));
    }
    Ok(email)
}

fn validate_phone(phone: &str) -> Result<String> {
    let phone = phone.trim();
    let phone_re = Regex::new(r"^\+?[0-9]{6,19}$").map_err(|e| Error::Other(e.to_string()))?;
    if !phone_re.is_match(phone) {
        return Err(Error::invalid_argument(format!("invalid phone number: {}", phone)));
    }
    Ok(phone.to_string())
}

#[cfg(test)]
pub(crate) fn sample_customer() -> Customer {
    let now = Utc::now();
    Customer {
        id: 1,
        customer_name: "John Doe".to_string(),
        username: "johndoe".to_string(),
        email: "johndoe@example.com".to_string(),
        phone: "081234567890".to_string(),
        cif_number: "CIF999".to_string(),
        failed_login_attempts: 0,
        is_locked: false,
        last_login: None,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_third_failure_locks() {
        let mut customer = sample_customer();
        customer.register_failed_login(LOCK_THRESHOLD);
        assert_eq!((customer.failed_login_attempts, customer.is_locked), (1, false));
        customer.register_failed_login(LOCK_THRESHOLD);
        assert_eq!((customer.failed_login_attempts, customer.is_locked), (2, false));
        customer.register_failed_login(LOCK_THRESHOLD);
        assert_eq!((customer.failed_login_attempts, customer.is_locked), (3, true));
    }

    #[test]
    fn test_success_keeps_lock() {
        let mut customer = sample_customer();
        for _ in 0..LOCK_THRESHOLD {
            customer.register_failed_login(LOCK_THRESHOLD);
        }
        let now = Utc::now();
        customer.register_successful_login(now);
        assert!(customer.is_locked);
        assert_eq!(customer.failed_login_attempts, 0);
        assert_eq!(customer.last_login, Some(now));
    }

    #[test]
    fn test_unlock_resets_both_fields() {
        let mut customer = sample_customer();
        customer.failed_login_attempts = 7;
        customer.is_locked = true;
        customer.unlock();
        assert!(!customer.is_locked);
        assert_eq!(customer.failed_login_attempts, 0);
    }

    #[test]
    fn test_new_customer_validation() {
        let mut new = NewCustomer {
            customer_name: " John Doe ".to_string(),
            username: "johndoe".to_string(),
            email: " JohnDoe@Example.com ".to_string(),
            phone: "081234567890".to_string(),
            cif_number: "cif999".to_string(),
        };
        new.validate().unwrap();
        assert_eq!(new.customer_name, "John Doe");
        assert_eq!(new.email, "johndoe@example.com");
        assert_eq!(new.cif_number, "CIF999");

        new.username = "jd".to_string();
        assert!(matches!(new.validate(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_bad_email_rejected() {
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("a@b").is_err());
        assert!(normalize_email("a@b.co").is_ok());
    }
}
