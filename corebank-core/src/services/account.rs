//! Account service - opening accounts and maintaining their profile
//!
//! Balances are out of scope here; they only move through [`LedgerService`].
//!
//! [`LedgerService`]: super::LedgerService

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountKey, AccountUpdate, CustomerKey, NewAccount};
use crate::ports::Repository;

pub struct AccountService {
    repository: Arc<dyn Repository>,
}

impl AccountService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Open an account for an existing customer
    pub fn open(&self, mut new: NewAccount) -> Result<Account> {
        new.validate()?;

        if self
            .repository
            .find_customer(&CustomerKey::Id(new.customer_id))?
            .is_none()
        {
            return Err(Error::not_found(format!("customer id {}", new.customer_id)));
        }
        if self
            .repository
            .find_account(&AccountKey::number(new.account_number.as_str()))?
            .is_some()
        {
            return Err(Error::conflict(format!(
                "account number already registered: {}",
                new.account_number
            )));
        }

        let account = self.repository.insert_account(&new)?;
        tracing::info!(
            account = %account.account_number,
            customer_id = account.customer_id,
            "account opened"
        );
        Ok(account)
    }

    pub fn get(&self, id: i64) -> Result<Account> {
        self.find(&AccountKey::Id(id))
    }

    pub fn get_by_number(&self, account_number: &str) -> Result<Account> {
        self.find(&AccountKey::number(account_number.trim()))
    }

    /// Accounts owned by `customer_id`, optionally only the active ones
    pub fn list_by_customer(&self, customer_id: i64, active_only: bool) -> Result<Vec<Account>> {
        self.repository
            .list_accounts_by_customer(customer_id, active_only)
    }

    pub fn update(&self, id: i64, update: AccountUpdate) -> Result<Account> {
        if update.is_empty() {
            return self.get(id);
        }
        self.repository
            .update_account(&AccountKey::Id(id), &mut |account| update.apply(account))?
            .ok_or_else(|| Error::not_found(format!("account id {}", id)))
    }

    /// Whether `account_number` exists and belongs to `customer_id`
    pub fn ensure_owned_by(&self, account_number: &str, customer_id: i64) -> Result<Account> {
        let account = self.get_by_number(account_number)?;
        if account.customer_id != customer_id {
            return Err(Error::Forbidden(format!(
                "account {} does not belong to customer id {}",
                account_number, customer_id
            )));
        }
        Ok(account)
    }

    fn find(&self, key: &AccountKey) -> Result<Account> {
        self.repository
            .find_account(key)?
            .ok_or_else(|| Error::not_found(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRepository;
    use crate::domain::NewCustomer;
    use rust_decimal::Decimal;

    fn setup() -> (AccountService, i64) {
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
        (AccountService::new(repo), customer.id)
    }

    #[test]
    fn test_open_seeds_both_balances() {
        let (service, customer_id) = setup();
        let account = service
            .open(
                NewAccount::new(customer_id, "1234567890", "John Doe - Savings", "savings")
                    .with_opening_balance(Decimal::new(1_000_000, 0)),
            )
            .unwrap();
        assert_eq!(account.clear_balance.to_string(), "1000000.00");
        assert_eq!(account.available_balance, account.clear_balance);
        assert_eq!(account.account_type, "SAVINGS");
        assert_eq!(account.currency_code, "IDR");
        assert!(account.is_active);
    }

    #[test]
    fn test_open_requires_owner_and_unique_number() {
        let (service, customer_id) = setup();
        assert!(matches!(
            service.open(NewAccount::new(99, "1234567890", "Orphan", "SAV")),
            Err(Error::NotFound(_))
        ));

        service
            .open(NewAccount::new(customer_id, "1234567890", "First", "SAV"))
            .unwrap();
        assert!(matches!(
            service.open(NewAccount::new(customer_id, "1234567890", "Second", "SAV")),
            Err(Error::Conflict(_))
        ));
    }

    #[test]
    fn test_negative_opening_balance_rejected() {
        let (service, customer_id) = setup();
        let new = NewAccount::new(customer_id, "1234567890", "Savings", "SAV")
            .with_opening_balance(Decimal::new(-1, 0));
        assert!(matches!(service.open(new), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_list_active_only() {
        let (service, customer_id) = setup();
        service
            .open(NewAccount::new(customer_id, "1111111111", "Savings", "SAV"))
            .unwrap();
        let checking = service
            .open(NewAccount::new(customer_id, "2222222222", "Checking", "CHK"))
            .unwrap();
        service
            .repository
            .update_account(&AccountKey::Id(checking.id), &mut |a| {
                a.deactivate();
                Ok(())
            })
            .unwrap();

        assert_eq!(service.list_by_customer(customer_id, false).unwrap().len(), 2);
        let active = service.list_by_customer(customer_id, true).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].account_number, "1111111111");
    }

    #[test]
    fn test_rename_and_ownership() {
        let (service, customer_id) = setup();
        let account = service
            .open(NewAccount::new(customer_id, "1234567890", "Savings", "SAV"))
            .unwrap();
        let renamed = service
            .update(
                account.id,
                AccountUpdate {
                    account_name: Some("Holiday fund".to_string()),
                },
            )
            .unwrap();
        assert_eq!(renamed.account_name, "Holiday fund");

        assert!(service.ensure_owned_by("1234567890", customer_id).is_ok());
        assert!(matches!(
            service.ensure_owned_by("1234567890", customer_id + 1),
            Err(Error::Forbidden(_))
        ));
    }
}
