//! CLI command implementations

pub mod account;
pub mod customer;
pub mod logs;
pub mod seed;
pub mod status;
pub mod tx;

use std::path::PathBuf;

use anyhow::{Context, Result};
use corebank_core::domain::money::parse_money;
use corebank_core::services::{LogEvent, LoggingService};
use corebank_core::{BankContext, Customer};
use dialoguer::Confirm;
use rust_decimal::Decimal;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        if let Err(e) = l.log(event) {
            tracing::debug!(error = %e, "could not write log entry");
        }
    }
}

/// Data directory from `COREBANK_DIR`, else `~/.corebank`
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("COREBANK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".corebank"))
        .context("Could not find home directory; set COREBANK_DIR")
}

pub fn get_context() -> Result<BankContext> {
    let data_dir = get_data_dir()?;
    BankContext::new(&data_dir)
        .with_context(|| format!("Failed to open corebank data in {}", data_dir.display()))
}

pub fn parse_amount(input: &str) -> Result<Decimal> {
    Ok(parse_money(input)?)
}

/// Look a customer up by numeric id or by username
pub fn resolve_customer(ctx: &BankContext, who: &str) -> Result<Customer> {
    let customer = match who.trim().parse::<i64>() {
        Ok(id) => ctx.customer_service.get(id)?,
        Err(_) => ctx.customer_service.get_by_username(who)?,
    };
    Ok(customer)
}

/// Ask before a destructive change; `--force` and `--json` skip the prompt
pub fn confirm(prompt: &str, force: bool, json: bool) -> Result<bool> {
    if force || json {
        return Ok(true);
    }
    if atty::isnt(atty::Stream::Stdin) {
        anyhow::bail!("Refusing to prompt without a terminal; pass --force");
    }
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
