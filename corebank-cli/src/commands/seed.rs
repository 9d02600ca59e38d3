//! Seed command - load a small demo data set

use std::time::Duration;

use anyhow::{bail, Result};
use indicatif::ProgressBar;
use rust_decimal::Decimal;
use serde::Serialize;

use super::get_context;
use crate::output;
use corebank_core::{NewAccount, NewCustomer};

struct SeedCustomer {
    name: &'static str,
    username: &'static str,
    email: &'static str,
    phone: &'static str,
    cif: &'static str,
    account_number: &'static str,
    /// Opening balance in minor units
    opening_cents: i64,
}

const SEED_CUSTOMERS: &[SeedCustomer] = &[
    SeedCustomer {
        name: "John Doe",
        username: "johndoe",
        email: "johndoe@example.com",
        phone: "081234567890",
        cif: "CIF999",
        account_number: "1234567890",
        opening_cents: 100_000_000,
    },
    SeedCustomer {
        name: "Jane Roe",
        username: "janeroe",
        email: "janeroe@example.com",
        phone: "081298765432",
        cif: "CIF100",
        account_number: "5555555555",
        opening_cents: 50_000_000,
    },
];

#[derive(Serialize)]
struct SeedResult {
    customers: usize,
    accounts: usize,
    transactions: usize,
}

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;

    if !ctx.customer_service.list(0, 1)?.is_empty() {
        bail!("Store already has customers; seed only runs against an empty store");
    }

    let spinner = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut ids = Vec::with_capacity(SEED_CUSTOMERS.len());
    for seed in SEED_CUSTOMERS {
        spinner.set_message(format!("Registering {}", seed.username));
        let customer = ctx.customer_service.register(NewCustomer {
            customer_name: seed.name.to_string(),
            username: seed.username.to_string(),
            email: seed.email.to_string(),
            phone: seed.phone.to_string(),
            cif_number: seed.cif.to_string(),
        })?;
        ctx.account_service.open(
            NewAccount::new(
                customer.id,
                seed.account_number,
                format!("{} - Savings", seed.name),
                "SAVINGS",
            )
            .with_currency(&ctx.config.default_currency)
            .with_opening_balance(Decimal::new(seed.opening_cents, 2)),
        )?;
        ids.push(customer.id);
    }

    spinner.set_message("Recording payments");
    let john = ids[0];
    ctx.payment_service.withdraw(
        john,
        "1234567890",
        Decimal::new(25_000_000, 2),
        Some("ATM withdrawal".to_string()),
    )?;
    ctx.payment_service.transfer(
        john,
        "1234567890",
        "5555555555",
        Decimal::new(10_000_000, 2),
        Some("Rent".to_string()),
    )?;
    spinner.finish_and_clear();

    let result = SeedResult {
        customers: SEED_CUSTOMERS.len(),
        accounts: SEED_CUSTOMERS.len(),
        transactions: 2,
    };
    if json {
        return output::json(&result);
    }
    output::success(&format!(
        "Seeded {} customers, {} accounts and {} transactions",
        result.customers, result.accounts, result.transactions
    ));
    Ok(())
}
