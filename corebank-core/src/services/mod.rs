//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on one feature area and shares the repository through an `Arc`.

mod account;
mod customer;
mod ledger;
pub mod logging;
mod login_guard;
pub mod migration;
mod payment;
mod status;
mod transaction;

pub use account::AccountService;
pub use customer::CustomerService;
pub use ledger::LedgerService;
pub use logging::{LogEntry, LogEvent, LoggingService};
pub use login_guard::LoginGuard;
pub use migration::{MigrationResult, MigrationService};
pub use payment::{PaymentReceipt, PaymentService};
pub use status::{StatusService, StatusSummary};
pub use transaction::TransactionService;
