//! Transaction commands - payments, the log and CSV export

use std::io;

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::Subcommand;
use colored::Colorize;

use super::{confirm, get_context, parse_amount, resolve_customer};
use crate::output::{self, format_money};
use corebank_core::services::PaymentReceipt;
use corebank_core::{NewTransaction, Transaction, TransactionQuery, TransactionStatus};

#[derive(Subcommand)]
pub enum TxCommands {
    /// Credit an account and record a DP transaction
    Deposit {
        customer: String,
        account: String,
        amount: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Debit the customer's own account and record a WD transaction
    Withdraw {
        customer: String,
        account: String,
        amount: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Move money between accounts and record a TR transaction
    Transfer {
        customer: String,
        from: String,
        to: String,
        amount: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Append a record without touching balances
    Record {
        customer: String,
        /// Type code: TR, WD, DP or any short code
        #[arg(long = "type")]
        kind: String,
        amount: String,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value = "SUCCESS")]
        status: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Show one transaction
    Show { id: i64 },
    /// List transactions, newest first
    List {
        /// Customer id or username
        #[arg(long)]
        customer: Option<String>,
        /// Touching this account on either side
        #[arg(long)]
        account: Option<String>,
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Only the last N days
        #[arg(long)]
        days: Option<u32>,
        #[arg(long, default_value = "0")]
        skip: usize,
        #[arg(long, default_value = "100")]
        limit: usize,
        /// Write CSV to stdout (wins over --json)
        #[arg(long)]
        csv: bool,
    },
    /// Settle a pending transaction
    Status {
        id: i64,
        /// SUCCESS or FAILED
        status: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

impl TxCommands {
    pub fn name(&self) -> &'static str {
        match self {
            TxCommands::Deposit { .. } => "deposit",
            TxCommands::Withdraw { .. } => "withdraw",
            TxCommands::Transfer { .. } => "transfer",
            TxCommands::Record { .. } => "record",
            TxCommands::Show { .. } => "show",
            TxCommands::List { .. } => "list",
            TxCommands::Status { .. } => "status",
        }
    }
}

pub fn run(command: TxCommands, json: bool) -> Result<()> {
    let ctx = get_context()?;

    match command {
        TxCommands::Deposit {
            customer,
            account,
            amount,
            description,
        } => {
            let id = resolve_customer(&ctx, &customer)?.id;
            let receipt =
                ctx.payment_service
                    .deposit(id, &account, parse_amount(&amount)?, description)?;
            print_receipt(&receipt, json)?;
        }
        TxCommands::Withdraw {
            customer,
            account,
            amount,
            description,
        } => {
            let id = resolve_customer(&ctx, &customer)?.id;
            let receipt =
                ctx.payment_service
                    .withdraw(id, &account, parse_amount(&amount)?, description)?;
            print_receipt(&receipt, json)?;
        }
        TxCommands::Transfer {
            customer,
            from,
            to,
            amount,
            description,
        } => {
            let id = resolve_customer(&ctx, &customer)?.id;
            let receipt = ctx.payment_service.transfer(
                id,
                &from,
                &to,
                parse_amount(&amount)?,
                description,
            )?;
            print_receipt(&receipt, json)?;
        }
        TxCommands::Record {
            customer,
            kind,
            amount,
            from,
            to,
            status,
            description,
        } => {
            let id = resolve_customer(&ctx, &customer)?.id;
            let mut new = NewTransaction::new(id, kind.parse()?, parse_amount(&amount)?)
                .with_status(status.parse()?)
                .with_description(description);
            new.from_account_number = from;
            new.to_account_number = to;

            let tx = ctx.transaction_service.record(new)?;
            if json {
                return output::json(&tx);
            }
            output::success(&format!("Recorded transaction {} ({})", tx.id, tx.status));
        }
        TxCommands::Show { id } => {
            let tx = ctx.transaction_service.get(id)?;
            if json {
                return output::json(&tx);
            }
            print_transactions(&[tx]);
        }
        TxCommands::List {
            customer,
            account,
            kind,
            status,
            days,
            skip,
            limit,
            csv,
        } => {
            let customer_id = match customer {
                Some(who) => Some(resolve_customer(&ctx, &who)?.id),
                None => None,
            };
            let query = TransactionQuery {
                customer_id,
                account_number: account,
                kind: kind.map(|k| k.parse()).transpose()?,
                status: status.map(|s| s.parse()).transpose()?,
                start: days.map(|d| Utc::now() - Duration::days(i64::from(d))),
                end: None,
                skip,
                limit,
            };
            let transactions = ctx.transaction_service.query(&query)?;

            if csv {
                return write_csv(&transactions);
            }
            if json {
                return output::json(&transactions);
            }
            if transactions.is_empty() {
                println!("No transactions found.");
                return Ok(());
            }
            print_transactions(&transactions);
            println!();
            println!("{} transaction(s)", transactions.len());
        }
        TxCommands::Status { id, status, force } => {
            let status: TransactionStatus = status.parse()?;
            if !confirm(
                &format!("Mark transaction {} as {}? This cannot be changed later.", id, status),
                force,
                json,
            )? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            let tx = ctx.transaction_service.update_status(id, status)?;
            if json {
                return output::json(&tx);
            }
            output::success(&format!("Transaction {} is now {}", tx.id, tx.status));
        }
    }

    Ok(())
}

fn print_receipt(receipt: &PaymentReceipt, json: bool) -> Result<()> {
    if json {
        return output::json(receipt);
    }
    let tx = &receipt.transaction;
    output::success(&format!(
        "{} of {} recorded as transaction {}",
        tx.kind.label(),
        format_money(tx.amount),
        tx.id
    ));
    println!(
        "  Account {} available: {}",
        receipt.balance_after.account_number,
        format_money(receipt.balance_after.available_balance)
    );
    Ok(())
}

fn print_transactions(transactions: &[Transaction]) {
    let mut table = output::create_table();
    table.set_header(vec![
        "ID", "Date", "Type", "Amount", "From", "To", "Status", "Description",
    ]);
    for tx in transactions {
        let status = match tx.status {
            TransactionStatus::Success => tx.status.to_string().green().to_string(),
            TransactionStatus::Failed => tx.status.to_string().red().to_string(),
            TransactionStatus::Pending => tx.status.to_string().yellow().to_string(),
        };
        table.add_row(vec![
            tx.id.to_string(),
            tx.transaction_date.format("%Y-%m-%d %H:%M").to_string(),
            tx.kind.to_string(),
            format_money(tx.amount),
            tx.from_account_number.clone().unwrap_or_default(),
            tx.to_account_number.clone().unwrap_or_default(),
            status,
            tx.description.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);
}

fn write_csv(transactions: &[Transaction]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record([
        "id",
        "transaction_date",
        "customer_id",
        "type",
        "amount",
        "from_account_number",
        "to_account_number",
        "status",
        "description",
    ])?;
    for tx in transactions {
        writer.write_record([
            tx.id.to_string(),
            tx.transaction_date.to_rfc3339(),
            tx.customer_id.to_string(),
            tx.kind.code().to_string(),
            tx.amount.to_string(),
            tx.from_account_number.clone().unwrap_or_default(),
            tx.to_account_number.clone().unwrap_or_default(),
            tx.status.to_string(),
            tx.description.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
