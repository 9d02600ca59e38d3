//! Repository port - persistence abstraction

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{
    Account, AccountKey, Customer, CustomerKey, NewAccount, NewCustomer, NewTransaction,
    Transaction, TransactionQuery,
};

/// In-place edit applied to a record inside an atomic update
///
/// Returning `Err` aborts the update: nothing is written and the error is
/// handed back to the caller unchanged.
pub type Mutation<'a, T> = &'a mut dyn FnMut(&mut T) -> Result<()>;

/// Record store behind the ledger, the login guard and the CRUD services
///
/// Every `update_*` method is a single atomic read-modify-write on one
/// record: the current row is read, the mutation runs, and the result is
/// written back without any other writer touching the same record in
/// between. Updates return `Ok(None)` when the key does not resolve.
/// Implementations stamp `updated_at` on every successful update and ignore
/// changes a mutation makes to identity columns.
pub trait Repository: Send + Sync {
    // === Customers ===

    fn find_customer(&self, key: &CustomerKey) -> Result<Option<Customer>>;

    /// Customers ordered by id
    fn list_customers(&self, skip: usize, limit: usize) -> Result<Vec<Customer>>;

    /// Insert a customer, assigning id and timestamps
    ///
    /// Fails with `Conflict` on a duplicate username, email or CIF number.
    fn insert_customer(&self, customer: &NewCustomer) -> Result<Customer>;

    fn update_customer(
        &self,
        id: i64,
        mutate: Mutation<'_, Customer>,
    ) -> Result<Option<Customer>>;

    // === Accounts ===

    fn find_account(&self, key: &AccountKey) -> Result<Option<Account>>;

    /// Accounts of one customer ordered by id
    fn list_accounts_by_customer(&self, customer_id: i64, active_only: bool)
        -> Result<Vec<Account>>;

    /// Insert an account, assigning id and timestamps
    ///
    /// Fails with `Conflict` on a duplicate account number.
    fn insert_account(&self, account: &NewAccount) -> Result<Account>;

    fn update_account(
        &self,
        key: &AccountKey,
        mutate: Mutation<'_, Account>,
    ) -> Result<Option<Account>>;

    // === Transactions ===

    fn find_transaction(&self, id: i64) -> Result<Option<Transaction>>;

    /// Transactions matching `query`, newest first, paginated
    fn query_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>>;

    /// Insert a transaction, assigning id and `created_at`
    fn insert_transaction(&self, tx: &NewTransaction) -> Result<Transaction>;

    /// Only the status of a transaction is writable
    fn update_transaction(
        &self,
        id: i64,
        mutate: Mutation<'_, Transaction>,
    ) -> Result<Option<Transaction>>;

    // === Reporting ===

    fn summary(&self) -> Result<StoreSummary>;
}

/// Aggregate counts across the store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreSummary {
    pub customers: i64,
    pub locked_customers: i64,
    pub accounts: i64,
    pub active_accounts: i64,
    pub transactions: i64,
    pub total_clear_balance: Decimal,
}
