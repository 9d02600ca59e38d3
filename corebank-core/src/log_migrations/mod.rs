//! Log database migrations - embedded SQL files
//!
//! Kept apart from the ledger schema: the log lives in its own database file
//! so it can be cleared or deleted without touching balances.

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    (
        crate::migrations::BOOTSTRAP,
        include_str!("000_migrations.sql"),
    ),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
