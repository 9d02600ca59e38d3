//! Ledger service - account balance mutation
//!
//! Every balance change is a single atomic update on the repository, so the
//! insufficient-funds check and the debit itself can never be split by a
//! concurrent writer.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::money::{require_non_negative, require_positive};
use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountKey, Balance};
use crate::ports::Repository;

pub struct LedgerService {
    repository: Arc<dyn Repository>,
    large_credit_threshold: Option<Decimal>,
}

impl LedgerService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self {
            repository,
            large_credit_threshold: None,
        }
    }

    /// Credits above `threshold` are logged at warn level (never rejected)
    pub fn with_large_credit_threshold(mut self, threshold: Decimal) -> Self {
        self.large_credit_threshold = Some(threshold);
        self
    }

    pub fn get_balance(&self, account_number: &str) -> Result<Balance> {
        self.repository
            .find_account(&AccountKey::number(account_number))?
            .map(|account| account.balance())
            .ok_or_else(|| Error::not_found(format!("account {}", account_number)))
    }

    /// Whether `amount` could be debited right now
    ///
    /// Unknown accounts report `false` rather than an error. The answer is
    /// advisory only; `debit` re-checks atomically.
    pub fn check_sufficient(&self, account_number: &str, amount: Decimal) -> Result<bool> {
        let amount = require_non_negative(amount)?;
        Ok(self
            .repository
            .find_account(&AccountKey::number(account_number))?
            .is_some_and(|account| account.covers(amount)))
    }

    /// Remove `amount` from both balances
    pub fn debit(&self, account_number: &str, amount: Decimal) -> Result<Account> {
        let amount = require_positive(amount)?;
        let result = self.mutate(account_number, &mut |account| account.apply_debit(amount));

        match &result {
            Ok(account) => tracing::debug!(
                account = %account_number,
                amount = %amount,
                available = %account.available_balance,
                "debited account"
            ),
            Err(e @ Error::InsufficientFunds { .. }) => tracing::warn!(
                account = %account_number,
                amount = %amount,
                error = %e,
                "debit rejected"
            ),
            Err(e) => tracing::warn!(account = %account_number, error = %e, "debit failed"),
        }
        result
    }

    /// Add `amount` to both balances
    pub fn credit(&self, account_number: &str, amount: Decimal) -> Result<Account> {
        let amount = require_positive(amount)?;
        if self
            .large_credit_threshold
            .is_some_and(|threshold| amount > threshold)
        {
            tracing::warn!(account = %account_number, amount = %amount, "large credit");
        }

        let account = self
            .mutate(account_number, &mut |account| account.apply_credit(amount))
            .inspect_err(|e| {
                tracing::warn!(account = %account_number, error = %e, "credit failed")
            })?;

        tracing::debug!(
            account = %account_number,
            amount = %amount,
            available = %account.available_balance,
            "credited account"
        );
        Ok(account)
    }

    /// Overwrite both balances unconditionally
    ///
    /// Administrative correction; it bypasses the insufficient-funds rule.
    pub fn set_balances(
        &self,
        account_number: &str,
        clear_balance: Decimal,
        available_balance: Decimal,
    ) -> Result<Account> {
        let clear_balance = require_non_negative(clear_balance)?;
        let available_balance = require_non_negative(available_balance)?;

        let account = self.mutate(account_number, &mut |account| {
            account.overwrite_balances(clear_balance, available_balance)
        })?;
        tracing::info!(
            account = %account_number,
            clear = %clear_balance,
            available = %available_balance,
            "balances overwritten"
        );
        Ok(account)
    }

    /// Mark the account inactive. Deactivating twice is not an error.
    pub fn deactivate(&self, account_number: &str) -> Result<Account> {
        let account = self.mutate(account_number, &mut |account| {
            account.deactivate();
            Ok(())
        })?;
        tracing::info!(account = %account_number, "account deactivated");
        Ok(account)
    }

    fn mutate(
        &self,
        account_number: &str,
        mutation: &mut dyn FnMut(&mut Account) -> Result<()>,
    ) -> Result<Account> {
        self.repository
            .update_account(&AccountKey::number(account_number), mutation)?
            .ok_or_else(|| Error::not_found(format!("account {}", account_number)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRepository;
    use crate::domain::{NewAccount, NewCustomer};

    fn money(units: i64) -> Decimal {
        Decimal::new(units * 100, 2)
    }

    fn setup(balance: Decimal) -> (Arc<InMemoryRepository>, LedgerService) {
        let repo = Arc::new(InMemoryRepository::new());
        let customer = repo
            .insert_customer(&NewCustomer {
                customer_name: "John Doe".to_string(),
                username: "johndoe".to_string(),
                email: "johndoe@example.com".to_string(),
                phone: "081234567890".to_string(),
                cif_number: "CIF999".to_string(),
            })
            .unwrap();
        repo.insert_account(
            &NewAccount::new(customer.id, "1234567890", "John Doe - Savings", "SAVINGS")
                .with_opening_balance(balance),
        )
        .unwrap();
        let ledger = LedgerService::new(repo.clone());
        (repo, ledger)
    }

    #[test]
    fn test_debit_then_credit_restores_balance() {
        let (_, ledger) = setup(money(1_000_000));
        let after_debit = ledger.debit("1234567890", money(100_000)).unwrap();
        assert_eq!(after_debit.clear_balance, money(900_000));
        assert_eq!(after_debit.available_balance, money(900_000));

        let after_credit = ledger.credit("1234567890", money(100_000)).unwrap();
        assert_eq!(after_credit.clear_balance, money(1_000_000));
        assert_eq!(after_credit.available_balance, money(1_000_000));
    }

    #[test]
    fn test_overdraft_is_rejected_without_write() {
        let (_, ledger) = setup(money(750_000));
        let err = ledger.debit("1234567890", money(1_000_000)).unwrap_err();
        match err {
            Error::InsufficientFunds {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, money(750_000));
                assert_eq!(requested, money(1_000_000));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            ledger.get_balance("1234567890").unwrap().available_balance,
            money(750_000)
        );
    }

    #[test]
    fn test_invalid_amount_checked_before_lookup() {
        let (_, ledger) = setup(money(10));
        assert!(matches!(
            ledger.debit("9999999999", Decimal::ZERO),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            ledger.credit("9999999999", money(-1)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            ledger.debit("1234567890", Decimal::new(1, 3)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unknown_account_is_not_found() {
        let (_, ledger) = setup(money(10));
        assert!(matches!(
            ledger.debit("9999999999", money(1)),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            ledger.credit("9999999999", money(1)),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            ledger.get_balance("9999999999"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_check_sufficient() {
        let (_, ledger) = setup(money(100));
        assert!(ledger.check_sufficient("1234567890", money(100)).unwrap());
        assert!(!ledger.check_sufficient("1234567890", money(101)).unwrap());
        assert!(!ledger.check_sufficient("9999999999", money(1)).unwrap());
        assert!(ledger.check_sufficient("1234567890", money(-1)).is_err());
    }

    #[test]
    fn test_set_balances_overwrites_both() {
        let (_, ledger) = setup(money(100));
        let account = ledger
            .set_balances("1234567890", money(5), money(3))
            .unwrap();
        assert_eq!(account.clear_balance, money(5));
        assert_eq!(account.available_balance, money(3));
        assert!(ledger.set_balances("1234567890", money(-1), money(0)).is_err());
    }

    #[test]
    fn test_deactivate_is_idempotent_and_blocks_mutation() {
        let (_, ledger) = setup(money(100));
        let first = ledger.deactivate("1234567890").unwrap();
        let second = ledger.deactivate("1234567890").unwrap();
        assert!(!first.is_active && !second.is_active);
        assert!(second.updated_at >= first.updated_at);

        assert!(matches!(
            ledger.credit("1234567890", money(1)),
            Err(Error::AccountInactive(_))
        ));
        assert_eq!(
            ledger.get_balance("1234567890").unwrap().clear_balance,
            money(100)
        );
    }

    #[test]
    fn test_credit_overflow_is_rejected_and_store_stays_usable() {
        let (_, ledger) = setup(crate::domain::money::max_money());

        assert!(matches!(
            ledger.credit("1234567890", Decimal::MAX),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            ledger.credit("1234567890", Decimal::new(1, 2)),
            Err(Error::InvalidArgument(_))
        ));

        let balance = ledger.get_balance("1234567890").unwrap();
        assert_eq!(balance.available_balance, crate::domain::money::max_money());
        ledger.debit("1234567890", money(1)).unwrap();
    }

    #[test]
    fn test_large_credit_is_accepted() {
        let (_, ledger) = setup(money(0));
        let ledger = ledger.with_large_credit_threshold(money(10));
        let account = ledger.credit("1234567890", money(1_000_000_000)).unwrap();
        assert_eq!(account.available_balance, money(1_000_000_000));
    }
}
