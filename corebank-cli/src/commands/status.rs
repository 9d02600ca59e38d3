//! Status command - store-wide counts and totals

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output::{self, format_money};

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status()?;

    if json {
        return output::json(&status);
    }

    println!("{}", "Bank Status".bold());
    println!();

    let summary = &status.summary;
    let mut table = output::create_table();
    table.add_row(vec![
        "Customers".to_string(),
        format!(
            "{} ({} locked)",
            summary.customers, summary.locked_customers
        ),
    ]);
    table.add_row(vec![
        "Accounts".to_string(),
        format!("{} ({} inactive)", summary.accounts, status.inactive_accounts),
    ]);
    table.add_row(vec![
        "Transactions".to_string(),
        summary.transactions.to_string(),
    ]);
    table.add_row(vec![
        "Total clear balance".to_string(),
        format_money(summary.total_clear_balance),
    ]);
    println!("{}", table);

    if summary.locked_customers > 0 {
        println!();
        output::warning(&format!(
            "{} customer(s) locked; see `cbk customer unlock`",
            summary.locked_customers
        ));
    }

    Ok(())
}
