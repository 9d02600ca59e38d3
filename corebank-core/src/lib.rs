//! Corebank Core - ledger and login-guard logic for a small banking core
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: Business entities (Customer, Account, Transaction) and their rules
//! - **ports**: The `Repository` trait every store implements
//! - **services**: Ledger, login guard and the CRUD/payment services around them
//! - **adapters**: DuckDB and in-memory repositories

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use adapters::DuckDbRepository;
use config::Config;
use ports::Repository;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{
    Account, AccountKey, AccountUpdate, Balance, Customer, CustomerKey, CustomerUpdate,
    LoginAttempt, NewAccount, NewCustomer, NewTransaction, Transaction, TransactionKind,
    TransactionQuery, TransactionStatus,
};

/// Ledger database file inside the data directory
pub const DB_FILE: &str = "corebank.duckdb";

/// Composition root: one repository shared by every service
pub struct BankContext {
    pub config: Config,
    pub repository: Arc<dyn Repository>,
    pub customer_service: CustomerService,
    pub account_service: AccountService,
    pub ledger: Arc<LedgerService>,
    pub login_guard: LoginGuard,
    pub transaction_service: TransactionService,
    pub payment_service: PaymentService,
    pub status_service: StatusService,
}

impl BankContext {
    /// Open the DuckDB store in `data_dir`, creating it on first use
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let config = Config::load(data_dir)?;
        let repository = Arc::new(DuckDbRepository::new(&data_dir.join(DB_FILE))?);
        Self::with_repository(repository, config)
    }

    /// Wire services around an existing repository
    pub fn with_repository(repository: Arc<dyn Repository>, config: Config) -> Result<Self> {
        config.validate()?;

        let ledger = Arc::new(
            LedgerService::new(Arc::clone(&repository))
                .with_large_credit_threshold(config.large_credit_threshold),
        );
        let login_guard = LoginGuard::with_threshold(Arc::clone(&repository), config.lock_threshold)?;

        Ok(Self {
            customer_service: CustomerService::new(Arc::clone(&repository)),
            account_service: AccountService::new(Arc::clone(&repository)),
            transaction_service: TransactionService::new(Arc::clone(&repository)),
            payment_service: PaymentService::new(Arc::clone(&repository), Arc::clone(&ledger)),
            status_service: StatusService::new(Arc::clone(&repository)),
            ledger,
            login_guard,
            repository,
            config,
        })
    }

    /// Context over a fresh in-memory store with default settings
    pub fn in_memory() -> Result<Self> {
        Self::with_repository(
            Arc::new(adapters::InMemoryRepository::new()),
            Config::default(),
        )
    }
}
