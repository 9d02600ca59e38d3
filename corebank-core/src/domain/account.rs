//! Account domain model

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::{add_money, require_non_negative, require_positive, sub_money};
use super::result::{Error, Result};

/// Currency assigned when the caller does not name one
pub const DEFAULT_CURRENCY: &str = "IDR";

/// A portfolio account owned by exactly one customer
///
/// `clear_balance` and `available_balance` move in lockstep; there is no
/// holds feature that would let them diverge. Once `is_active` is false the
/// account still reads normally but rejects every balance mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub account_number: String,
    pub customer_id: i64,
    pub account_name: String,
    /// Free-form product code, e.g. "SAV" or "CHK"
    pub account_type: String,
    /// ISO 4217 currency code, normalized to uppercase
    pub currency_code: String,
    pub clear_balance: Decimal,
    pub available_balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Point-in-time view of both balances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub account_number: String,
    pub clear_balance: Decimal,
    pub available_balance: Decimal,
}

impl Account {
    pub fn balance(&self) -> Balance {
        Balance {
            account_number: self.account_number.clone(),
            clear_balance: self.clear_balance,
            available_balance: self.available_balance,
        }
    }

    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active {
            Ok(())
        } else {
            Err(Error::AccountInactive(self.account_number.clone()))
        }
    }

    /// Whether `amount` can be debited right now
    pub fn covers(&self, amount: Decimal) -> bool {
        self.available_balance >= amount
    }

    /// Remove `amount` from both balances
    pub fn apply_debit(&mut self, amount: Decimal) -> Result<()> {
        let amount = require_positive(amount)?;
        self.ensure_active()?;
        if !self.covers(amount) {
            return Err(Error::InsufficientFunds {
                account_number: self.account_number.clone(),
                available: self.available_balance,
                requested: amount,
            });
        }
        let clear = sub_money(self.clear_balance, amount)?;
        let available = sub_money(self.available_balance, amount)?;
        self.clear_balance = clear;
        self.available_balance = available;
        Ok(())
    }

    /// Add `amount` to both balances
    ///
    /// A sum beyond the storable range is rejected and leaves both balances
    /// as they were.
    pub fn apply_credit(&mut self, amount: Decimal) -> Result<()> {
        let amount = require_positive(amount)?;
        self.ensure_active()?;
        let clear = add_money(self.clear_balance, amount)?;
        let available = add_money(self.available_balance, amount)?;
        self.clear_balance = clear;
        self.available_balance = available;
        Ok(())
    }

    /// Overwrite both balances unconditionally
    pub fn overwrite_balances(&mut self, clear: Decimal, available: Decimal) -> Result<()> {
        let clear = require_non_negative(clear)?;
        let available = require_non_negative(available)?;
        self.ensure_active()?;
        self.clear_balance = clear;
        self.available_balance = available;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Normalize currency code to uppercase
    pub fn normalize_currency(currency: &str) -> String {
        currency.trim().to_uppercase()
    }
}

/// Lookup key for a single account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKey {
    Id(i64),
    Number(String),
}

impl AccountKey {
    pub fn number(number: impl Into<String>) -> Self {
        Self::Number(number.into())
    }
}

impl std::fmt::Display for AccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountKey::Id(id) => write!(f, "account id {}", id),
            AccountKey::Number(number) => write!(f, "account {}", number),
        }
    }
}

/// Fields accepted when opening an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub customer_id: i64,
    pub account_number: String,
    pub account_name: String,
    pub account_type: String,
    pub currency_code: String,
    /// Seeds both balances
    pub opening_balance: Decimal,
}

impl NewAccount {
    pub fn new(
        customer_id: i64,
        account_number: impl Into<String>,
        account_name: impl Into<String>,
        account_type: impl Into<String>,
    ) -> Self {
        Self {
            customer_id,
            account_number: account_number.into(),
            account_name: account_name.into(),
            account_type: account_type.into(),
            currency_code: DEFAULT_CURRENCY.to_string(),
            opening_balance: Decimal::ZERO,
        }
    }

    pub fn with_opening_balance(mut self, balance: Decimal) -> Self {
        self.opening_balance = balance;
        self
    }

    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency_code = currency.to_string();
        self
    }

    /// Validate and normalize in place
    pub fn validate(&mut self) -> Result<()> {
        self.account_number = self.account_number.trim().to_string();
        validate_account_number(&self.account_number)?;

        self.account_name = self.account_name.trim().to_string();
        if self.account_name.is_empty() || self.account_name.len() > 100 {
            return Err(Error::invalid_argument(
                "account name must be between 1 and 100 characters",
            ));
        }

        self.account_type = self.account_type.trim().to_uppercase();
        if self.account_type.is_empty() || self.account_type.len() > 10 {
            return Err(Error::invalid_argument(
                "account type must be between 1 and 10 characters",
            ));
        }

        self.currency_code = Account::normalize_currency(&self.currency_code);
        if self.currency_code.len() != 3
            || !self.currency_code.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(Error::invalid_argument(format!(
                "currency code must be three letters, got '{}'",
                self.currency_code
            )));
        }

        self.opening_balance = require_non_negative(self.opening_balance)?;
        Ok(())
    }
}

/// Profile fields an account update may change
///
/// Balances and the active flag are deliberately absent; they only move
/// through the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub account_name: Option<String>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.account_name.is_none()
    }

    pub fn apply(&self, account: &mut Account) -> Result<()> {
        if let Some(name) = &self.account_name {
            let name = name.trim();
            if name.is_empty() || name.len() > 100 {
                return Err(Error::invalid_argument(
                    "account name must be between 1 and 100 characters",
                ));
            }
            account.account_name = name.to_string();
        }
        Ok(())
    }
}

/// Account numbers are 10 to 20 ASCII digits
pub fn validate_account_number(number: &str) -> Result<()> {
    let re = Regex::new(r"^[0-9]{10,20}$").map_err(|e| Error::Other(e.to_string()))?;
    if re.is_match(number) {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "account number must be 10-20 digits, got '{}'",
            number
        )))
    }
}

#[cfg(test)]
pub(crate) fn sample_account(balance: Decimal) -> Account {
    let now = Utc::now();
    Account {
        id: 1,
        account_number: "1234567890".to_string(),
        customer_id: 1,
        account_name: "John Doe - Savings".to_string(),
        account_type: "SAV".to_string(),
        currency_code: DEFAULT_CURRENCY.to_string(),
        clear_balance: balance,
        available_balance: balance,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(units: i64) -> Decimal {
        Decimal::new(units * 100, 2)
    }

    #[test]
    fn test_debit_moves_both_balances() {
        let mut account = sample_account(money(1_000_000));
        account.apply_debit(money(250_000)).unwrap();
        assert_eq!(account.clear_balance, money(750_000));
        assert_eq!(account.available_balance, money(750_000));
    }

    #[test]
    fn test_debit_of_exact_balance_reaches_zero() {
        let mut account = sample_account(money(100));
        account.apply_debit(money(100)).unwrap();
        assert_eq!(account.available_balance, Decimal::ZERO);
    }

    #[test]
    fn test_overdraft_leaves_balances_untouched() {
        let mut account = sample_account(money(750_000));
        let err = account.apply_debit(money(1_000_000)).unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds { .. }));
        assert_eq!(account.clear_balance, money(750_000));
        assert_eq!(account.available_balance, money(750_000));
    }

    #[test]
    fn test_credit_past_ceiling_leaves_balances_untouched() {
        let mut account = sample_account(crate::domain::money::max_money());
        assert!(matches!(
            account.apply_credit(Decimal::new(1, 2)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            account.apply_credit(Decimal::MAX),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(account.clear_balance, crate::domain::money::max_money());
        assert_eq!(account.available_balance, crate::domain::money::max_money());
    }

    #[test]
    fn test_inactive_account_rejects_mutation() {
        let mut account = sample_account(money(10));
        account.deactivate();
        assert!(matches!(
            account.apply_credit(money(1)),
            Err(Error::AccountInactive(_))
        ));
        assert!(matches!(
            account.apply_debit(money(1)),
            Err(Error::AccountInactive(_))
        ));
        assert!(matches!(
            account.overwrite_balances(money(1), money(1)),
            Err(Error::AccountInactive(_))
        ));
    }

    #[test]
    fn test_non_positive_amounts_are_invalid() {
        let mut account = sample_account(money(10));
        assert!(matches!(
            account.apply_debit(Decimal::ZERO),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            account.apply_credit(money(-5)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_new_account_validation_normalizes() {
        let mut new = NewAccount::new(1, " 1234567890 ", " Savings ", "sav").with_currency("idr");
        new.validate().unwrap();
        assert_eq!(new.account_number, "1234567890");
        assert_eq!(new.account_name, "Savings");
        assert_eq!(new.account_type, "SAV");
        assert_eq!(new.currency_code, "IDR");
        assert_eq!(new.opening_balance.to_string(), "0.00");
    }

    #[test]
    fn test_account_number_shape() {
        assert!(validate_account_number("1234567890").is_ok());
        assert!(validate_account_number("12345").is_err());
        assert!(validate_account_number("12345abcde").is_err());
    }

    #[test]
    fn test_update_cannot_blank_name() {
        let mut account = sample_account(money(1));
        let update = AccountUpdate {
            account_name: Some("   ".to_string()),
        };
        assert!(update.apply(&mut account).is_err());
        assert_eq!(account.account_name, "John Doe - Savings");
    }
}
