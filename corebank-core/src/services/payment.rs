//! Payment service - deposits, withdrawals and transfers
//!
//! Each payment applies its ledger legs first and records a `SUCCESS`
//! transaction afterwards. The legs of a transfer are separate atomic
//! updates: if the credit leg fails after the debit went through, the error
//! is returned and logged, and no compensating credit is attempted.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::money::require_positive;
use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, AccountKey, Balance, CustomerKey, NewTransaction, Transaction, TransactionKind,
};
use crate::ports::Repository;
use crate::services::LedgerService;

/// Outcome of a completed payment
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub transaction: Transaction,
    /// Balance of the customer's account after the payment (the source
    /// account for transfers)
    pub balance_after: Balance,
}

pub struct PaymentService {
    repository: Arc<dyn Repository>,
    ledger: Arc<LedgerService>,
}

impl PaymentService {
    pub fn new(repository: Arc<dyn Repository>, ledger: Arc<LedgerService>) -> Self {
        Self { repository, ledger }
    }

    pub fn deposit(
        &self,
        customer_id: i64,
        account_number: &str,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<PaymentReceipt> {
        let amount = require_positive(amount)?;
        self.ensure_customer(customer_id)?;

        let account = self.ledger.credit(account_number, amount)?;
        let tx = self.record(
            NewTransaction::new(customer_id, TransactionKind::Deposit, amount)
                .to_account(account_number)
                .with_description(description),
        )?;
        Ok(PaymentReceipt {
            transaction: tx,
            balance_after: account.balance(),
        })
    }

    pub fn withdraw(
        &self,
        customer_id: i64,
        account_number: &str,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<PaymentReceipt> {
        let amount = require_positive(amount)?;
        self.owned_account(customer_id, account_number)?;

        let account = self.ledger.debit(account_number, amount)?;
        let tx = self.record(
            NewTransaction::new(customer_id, TransactionKind::Withdrawal, amount)
                .from_account(account_number)
                .with_description(description),
        )?;
        Ok(PaymentReceipt {
            transaction: tx,
            balance_after: account.balance(),
        })
    }

    pub fn transfer(
        &self,
        customer_id: i64,
        from_account: &str,
        to_account: &str,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<PaymentReceipt> {
        let amount = require_positive(amount)?;
        if from_account == to_account {
            return Err(Error::invalid_argument(
                "source and destination accounts must differ",
            ));
        }
        self.owned_account(customer_id, from_account)?;
        if self
            .repository
            .find_account(&AccountKey::number(to_account))?
            .is_none()
        {
            return Err(Error::not_found(format!("account {}", to_account)));
        }

        let source = self.ledger.debit(from_account, amount)?;
        if let Err(e) = self.ledger.credit(to_account, amount) {
            tracing::error!(
                from = %from_account,
                to = %to_account,
                amount = %amount,
                error = %e,
                "transfer credit leg failed after debit"
            );
            return Err(e);
        }

        let tx = self.record(
            NewTransaction::new(customer_id, TransactionKind::Transfer, amount)
                .from_account(from_account)
                .to_account(to_account)
                .with_description(description),
        )?;
        Ok(PaymentReceipt {
            transaction: tx,
            balance_after: source.balance(),
        })
    }

    fn ensure_customer(&self, customer_id: i64) -> Result<()> {
        match self.repository.find_customer(&CustomerKey::Id(customer_id))? {
            Some(_) => Ok(()),
            None => Err(Error::not_found(format!("customer id {}", customer_id))),
        }
    }

    fn owned_account(&self, customer_id: i64, account_number: &str) -> Result<Account> {
        self.ensure_customer(customer_id)?;
        let account = self
            .repository
            .find_account(&AccountKey::number(account_number))?
            .ok_or_else(|| Error::not_found(format!("account {}", account_number)))?;
        if account.customer_id != customer_id {
            tracing::warn!(customer_id, account = %account_number, "account ownership mismatch");
            return Err(Error::Forbidden(format!(
                "account {} does not belong to customer id {}",
                account_number, customer_id
            )));
        }
        Ok(account)
    }

    fn record(&self, mut new: NewTransaction) -> Result<Transaction> {
        new.validate()?;
        let tx = self.repository.insert_transaction(&new)?;
        tracing::debug!(transaction_id = tx.id, kind = %tx.kind, "payment recorded");
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRepository;
    use crate::domain::{NewAccount, NewCustomer, TransactionQuery, TransactionStatus};

    fn money(units: i64) -> Decimal {
        Decimal::new(units * 100, 2)
    }

    struct Fixture {
        repo: Arc<InMemoryRepository>,
        payments: PaymentService,
        john: i64,
        jane: i64,
    }

    fn customer(repo: &InMemoryRepository, username: &str, cif: &str) -> i64 {
        repo.insert_customer(&NewCustomer {
            customer_name: username.to_string(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            phone: "081234567890".to_string(),
            cif_number: cif.to_string(),
        })
        .unwrap()
        .id
    }

    fn setup() -> Fixture {
        let repo = Arc::new(InMemoryRepository::new());
        let john = customer(&repo, "johndoe", "CIF999");
        let jane = customer(&repo, "janeroe", "CIF100");
        repo.insert_account(
            &NewAccount::new(john, "1234567890", "John Doe - Savings", "SAVINGS")
                .with_opening_balance(money(1_000_000)),
        )
        .unwrap();
        repo.insert_account(&NewAccount::new(jane, "5555555555", "Jane Roe - Savings", "SAVINGS"))
            .unwrap();

        let ledger = Arc::new(LedgerService::new(repo.clone()));
        Fixture {
            payments: PaymentService::new(repo.clone(), ledger),
            repo,
            john,
            jane,
        }
    }

    fn available(repo: &InMemoryRepository, number: &str) -> Decimal {
        repo.find_account(&AccountKey::number(number))
            .unwrap()
            .unwrap()
            .available_balance
    }

    #[test]
    fn test_withdraw_records_wd() {
        let f = setup();
        let receipt = f
            .payments
            .withdraw(f.john, "1234567890", money(250_000), None)
            .unwrap();
        assert_eq!(receipt.balance_after.available_balance, money(750_000));
        assert_eq!(receipt.transaction.kind, TransactionKind::Withdrawal);
        assert_eq!(receipt.transaction.status, TransactionStatus::Success);
        assert_eq!(
            receipt.transaction.from_account_number.as_deref(),
            Some("1234567890")
        );
    }

    #[test]
    fn test_withdraw_from_foreign_account_is_forbidden() {
        let f = setup();
        assert!(matches!(
            f.payments.withdraw(f.jane, "1234567890", money(1), None),
            Err(Error::Forbidden(_))
        ));
        assert_eq!(available(&f.repo, "1234567890"), money(1_000_000));
    }

    #[test]
    fn test_failed_withdrawal_records_nothing() {
        let f = setup();
        assert!(matches!(
            f.payments.withdraw(f.john, "1234567890", money(2_000_000), None),
            Err(Error::InsufficientFunds { .. })
        ));
        let history = f
            .repo
            .query_transactions(&TransactionQuery::for_customer(f.john))
            .unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_transfer_moves_money_and_records_tr() {
        let f = setup();
        let receipt = f
            .payments
            .transfer(
                f.john,
                "1234567890",
                "5555555555",
                money(100_000),
                Some("rent".to_string()),
            )
            .unwrap();
        assert_eq!(receipt.transaction.kind, TransactionKind::Transfer);
        assert_eq!(receipt.transaction.description.as_deref(), Some("rent"));
        assert_eq!(available(&f.repo, "1234567890"), money(900_000));
        assert_eq!(available(&f.repo, "5555555555"), money(100_000));
    }

    #[test]
    fn test_transfer_validation_happens_before_mutation() {
        let f = setup();
        assert!(matches!(
            f.payments
                .transfer(f.john, "1234567890", "1234567890", money(1), None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            f.payments
                .transfer(f.john, "1234567890", "9999999999", money(1), None),
            Err(Error::NotFound(_))
        ));
        assert_eq!(available(&f.repo, "1234567890"), money(1_000_000));
    }

    #[test]
    fn test_transfer_into_inactive_account_keeps_debit() {
        let f = setup();
        f.repo
            .update_account(&AccountKey::number("5555555555"), &mut |a| {
                a.deactivate();
                Ok(())
            })
            .unwrap();

        let err = f
            .payments
            .transfer(f.john, "1234567890", "5555555555", money(10), None)
            .unwrap_err();
        assert!(matches!(err, Error::AccountInactive(_)));
        // legs are not atomic across accounts
        assert_eq!(available(&f.repo, "1234567890"), money(999_990));
    }

    #[test]
    fn test_deposit_to_any_account() {
        let f = setup();
        let receipt = f
            .payments
            .deposit(f.john, "5555555555", money(50), None)
            .unwrap();
        assert_eq!(receipt.transaction.kind, TransactionKind::Deposit);
        assert_eq!(receipt.balance_after.available_balance, money(50));
        assert!(matches!(
            f.payments.deposit(404, "5555555555", money(50), None),
            Err(Error::NotFound(_))
        ));
    }
}
