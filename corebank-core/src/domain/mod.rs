//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
mod customer;
pub mod money;
pub mod result;
mod transaction;

pub use account::{
    validate_account_number, Account, AccountKey, AccountUpdate, Balance, NewAccount,
    DEFAULT_CURRENCY,
};
pub use customer::{
    normalize_email, Customer, CustomerKey, CustomerUpdate, LoginAttempt, NewCustomer,
    LOCK_THRESHOLD,
};
pub use transaction::{
    NewTransaction, Transaction, TransactionKind, TransactionQuery, TransactionStatus,
    DEFAULT_PAGE_LIMIT,
};
