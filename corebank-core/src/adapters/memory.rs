//! In-memory repository implementation
//!
//! Intended for tests and embedding. Every write takes the store-wide write
//! lock for its whole read-modify-write, so updates are atomic per record.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, AccountKey, Customer, CustomerKey, NewAccount, NewCustomer, NewTransaction,
    Transaction, TransactionQuery,
};
use crate::ports::{Mutation, Repository, StoreSummary};

#[derive(Debug, Default)]
struct Tables {
    customers: BTreeMap<i64, Customer>,
    accounts: BTreeMap<i64, Account>,
    transactions: BTreeMap<i64, Transaction>,
    last_customer_id: i64,
    last_account_id: i64,
    last_transaction_id: i64,
}

impl Tables {
    fn customer_id(&self, key: &CustomerKey) -> Option<i64> {
        match key {
            CustomerKey::Id(id) => self.customers.contains_key(id).then_some(*id),
            CustomerKey::Username(username) => self
                .customers
                .values()
                .find(|c| &c.username == username)
                .map(|c| c.id),
            CustomerKey::Email(email) => self
                .customers
                .values()
                .find(|c| &c.email == email)
                .map(|c| c.id),
            CustomerKey::Cif(cif) => self
                .customers
                .values()
                .find(|c| &c.cif_number == cif)
                .map(|c| c.id),
        }
    }

    fn account_id(&self, key: &AccountKey) -> Option<i64> {
        match key {
            AccountKey::Id(id) => self.accounts.contains_key(id).then_some(*id),
            AccountKey::Number(number) => self
                .accounts
                .values()
                .find(|a| &a.account_number == number)
                .map(|a| a.id),
        }
    }
}

fn next_id(last: &mut i64) -> i64 {
    *last += 1;
    *last
}

/// Repository backed by ordered maps behind a single `RwLock`
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| Error::database("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| Error::database("in-memory store lock poisoned"))
    }
}

impl Repository for InMemoryRepository {
    fn find_customer(&self, key: &CustomerKey) -> Result<Option<Customer>> {
        let tables = self.read()?;
        Ok(tables
            .customer_id(key)
            .and_then(|id| tables.customers.get(&id).cloned()))
    }

    fn list_customers(&self, skip: usize, limit: usize) -> Result<Vec<Customer>> {
        let tables = self.read()?;
        Ok(tables
            .customers
            .values()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    fn insert_customer(&self, new: &NewCustomer) -> Result<Customer> {
        let mut tables = self.write()?;

        if tables
            .customer_id(&CustomerKey::Username(new.username.clone()))
            .is_some()
        {
            return Err(Error::conflict(format!("username {} already registered", new.username)));
        }
        if tables
            .customer_id(&CustomerKey::Email(new.email.clone()))
            .is_some()
        {
            return Err(Error::conflict(format!("email {} already registered", new.email)));
        }
        if tables
            .customer_id(&CustomerKey::Cif(new.cif_number.clone()))
            .is_some()
        {
            return Err(Error::conflict(format!(
                "CIF number {} already registered",
                new.cif_number
            )));
        }

        let now = Utc::now();
        let customer = Customer {
            id: next_id(&mut tables.last_customer_id),
            customer_name: new.customer_name.clone(),
            username: new.username.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            cif_number: new.cif_number.clone(),
            failed_login_attempts: 0,
            is_locked: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        tables.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    fn update_customer(
        &self,
        id: i64,
        mutate: Mutation<'_, Customer>,
    ) -> Result<Option<Customer>> {
        let mut tables = self.write()?;
        let Some(current) = tables.customers.get(&id).cloned() else {
            return Ok(None);
        };

        let mut draft = current.clone();
        mutate(&mut draft)?;

        if draft.email != current.email
            && tables
                .customer_id(&CustomerKey::Email(draft.email.clone()))
                .is_some_and(|other| other != id)
        {
            return Err(Error::conflict(format!("email {} already registered", draft.email)));
        }

        // identity columns are not writable through an update
        draft.id = current.id;
        draft.username = current.username;
        draft.cif_number = current.cif_number;
        draft.created_at = current.created_at;
        draft.updated_at = Utc::now();

        tables.customers.insert(id, draft.clone());
        Ok(Some(draft))
    }

    fn find_account(&self, key: &AccountKey) -> Result<Option<Account>> {
        let tables = self.read()?;
        Ok(tables
            .account_id(key)
            .and_then(|id| tables.accounts.get(&id).cloned()))
    }

    fn list_accounts_by_customer(
        &self,
        customer_id: i64,
        active_only: bool,
    ) -> Result<Vec<Account>> {
        let tables = self.read()?;
        Ok(tables
            .accounts
            .values()
            .filter(|a| a.customer_id == customer_id && (!active_only || a.is_active))
            .cloned()
            .collect())
    }

    fn insert_account(&self, new: &NewAccount) -> Result<Account> {
        let mut tables = self.write()?;

        if tables
            .account_id(&AccountKey::Number(new.account_number.clone()))
            .is_some()
        {
            return Err(Error::conflict(format!(
                "account number {} already registered",
                new.account_number
            )));
        }

        let now = Utc::now();
        let account = Account {
            id: next_id(&mut tables.last_account_id),
            account_number: new.account_number.clone(),
            customer_id: new.customer_id,
            account_name: new.account_name.clone(),
            account_type: new.account_type.clone(),
            currency_code: new.currency_code.clone(),
            clear_balance: new.opening_balance,
            available_balance: new.opening_balance,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    fn update_account(
        &self,
        key: &AccountKey,
        mutate: Mutation<'_, Account>,
    ) -> Result<Option<Account>> {
        let mut tables = self.write()?;
        let Some(id) = tables.account_id(key) else {
            return Ok(None);
        };
        let Some(current) = tables.accounts.get(&id).cloned() else {
            return Ok(None);
        };

        let mut draft = current.clone();
        mutate(&mut draft)?;

        draft.id = current.id;
        draft.account_number = current.account_number;
        draft.customer_id = current.customer_id;
        draft.account_type = current.account_type;
        draft.currency_code = current.currency_code;
        draft.created_at = current.created_at;
        draft.updated_at = Utc::now();

        tables.accounts.insert(id, draft.clone());
        Ok(Some(draft))
    }

    fn find_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        Ok(self.read()?.transactions.get(&id).cloned())
    }

    fn query_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        let tables = self.read()?;
        let mut matched: Vec<Transaction> = tables
            .transactions
            .values()
            .filter(|tx| query.matches(tx))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            b.transaction_date
                .cmp(&a.transaction_date)
                .then(b.id.cmp(&a.id))
        });
        Ok(matched
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .collect())
    }

    fn insert_transaction(&self, new: &NewTransaction) -> Result<Transaction> {
        let mut tables = self.write()?;
        let now = Utc::now();
        let tx = Transaction {
            id: next_id(&mut tables.last_transaction_id),
            customer_id: new.customer_id,
            kind: new.kind.clone(),
            amount: new.amount,
            from_account_number: new.from_account_number.clone(),
            to_account_number: new.to_account_number.clone(),
            status: new.status,
            description: new.description.clone(),
            transaction_date: new.transaction_date.unwrap_or(now),
            created_at: now,
        };
        tables.transactions.insert(tx.id, tx.clone());
        Ok(tx)
    }

    fn update_transaction(
        &self,
        id: i64,
        mutate: Mutation<'_, Transaction>,
    ) -> Result<Option<Transaction>> {
        let mut tables = self.write()?;
        let Some(current) = tables.transactions.get(&id).cloned() else {
            return Ok(None);
        };

        let mut draft = current.clone();
        mutate(&mut draft)?;

        let updated = Transaction {
            status: draft.status,
            ..current
        };
        tables.transactions.insert(id, updated.clone());
        Ok(Some(updated))
    }

    fn summary(&self) -> Result<StoreSummary> {
        let tables = self.read()?;
        Ok(StoreSummary {
            customers: tables.customers.len() as i64,
            locked_customers: tables.customers.values().filter(|c| c.is_locked).count() as i64,
            accounts: tables.accounts.len() as i64,
            active_accounts: tables.accounts.values().filter(|a| a.is_active).count() as i64,
            transactions: tables.transactions.len() as i64,
            total_clear_balance: tables
                .accounts
                .values()
                .map(|a| a.clear_balance)
                .sum::<Decimal>(),
        })
    }
}
