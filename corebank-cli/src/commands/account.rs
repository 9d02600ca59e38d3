//! Account commands - opening accounts and moving their balances

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use super::{confirm, get_context, parse_amount, resolve_customer};
use crate::output::{self, format_money};
use corebank_core::{Account, AccountUpdate, NewAccount};

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Open an account for a customer (id or username)
    Open {
        customer: String,
        /// Account number, 10 to 20 digits
        #[arg(long)]
        number: String,
        #[arg(long)]
        name: String,
        #[arg(long = "type", default_value = "SAVINGS")]
        account_type: String,
        /// Defaults to bank.defaultCurrency
        #[arg(long)]
        currency: Option<String>,
        /// Seeds both balances
        #[arg(long, default_value = "0")]
        opening_balance: String,
    },
    /// Show one account
    Show { number: String },
    /// List a customer's accounts
    List {
        customer: String,
        /// Hide deactivated accounts
        #[arg(long)]
        active_only: bool,
    },
    /// Show clear and available balances
    Balance { number: String },
    /// Check whether an amount could be debited
    Check { number: String, amount: String },
    /// Remove an amount from both balances
    Debit { number: String, amount: String },
    /// Add an amount to both balances
    Credit { number: String, amount: String },
    /// Overwrite balances (administrative correction)
    SetBalance {
        number: String,
        #[arg(long)]
        clear: String,
        /// Defaults to the clear balance
        #[arg(long)]
        available: Option<String>,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Stop debits and credits on an account
    Deactivate {
        number: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Change the account name
    Rename { number: String, name: String },
}

impl AccountCommands {
    pub fn name(&self) -> &'static str {
        match self {
            AccountCommands::Open { .. } => "open",
            AccountCommands::Show { .. } => "show",
            AccountCommands::List { .. } => "list",
            AccountCommands::Balance { .. } => "balance",
            AccountCommands::Check { .. } => "check",
            AccountCommands::Debit { .. } => "debit",
            AccountCommands::Credit { .. } => "credit",
            AccountCommands::SetBalance { .. } => "set-balance",
            AccountCommands::Deactivate { .. } => "deactivate",
            AccountCommands::Rename { .. } => "rename",
        }
    }
}

pub fn run(command: AccountCommands, json: bool) -> Result<()> {
    let ctx = get_context()?;

    match command {
        AccountCommands::Open {
            customer,
            number,
            name,
            account_type,
            currency,
            opening_balance,
        } => {
            let owner = resolve_customer(&ctx, &customer)?;
            let currency = currency.unwrap_or_else(|| ctx.config.default_currency.clone());
            let account = ctx.account_service.open(
                NewAccount::new(owner.id, number, name, account_type)
                    .with_currency(&currency)
                    .with_opening_balance(parse_amount(&opening_balance)?),
            )?;
            if json {
                return output::json(&account);
            }
            output::success(&format!(
                "Opened account {} for {} with {} {}",
                account.account_number,
                owner.username,
                account.currency_code,
                format_money(account.available_balance)
            ));
        }
        AccountCommands::Show { number } => {
            let account = ctx.account_service.get_by_number(&number)?;
            if json {
                return output::json(&account);
            }
            print_account(&account);
        }
        AccountCommands::List {
            customer,
            active_only,
        } => {
            let owner = resolve_customer(&ctx, &customer)?;
            let accounts = ctx.account_service.list_by_customer(owner.id, active_only)?;
            if json {
                return output::json(&accounts);
            }
            if accounts.is_empty() {
                println!("No accounts found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Number", "Name", "Type", "Currency", "Available", "Active"]);
            for a in &accounts {
                table.add_row(vec![
                    a.account_number.clone(),
                    a.account_name.clone(),
                    a.account_type.clone(),
                    a.currency_code.clone(),
                    format_money(a.available_balance),
                    if a.is_active { "yes".to_string() } else { "no".dimmed().to_string() },
                ]);
            }
            println!("{}", table);
        }
        AccountCommands::Balance { number } => {
            let balance = ctx.ledger.get_balance(&number)?;
            if json {
                return output::json(&balance);
            }
            println!("{}", format!("Account {}", balance.account_number).bold());
            println!("  Clear:     {}", format_money(balance.clear_balance));
            println!("  Available: {}", format_money(balance.available_balance));
        }
        AccountCommands::Check { number, amount } => {
            let amount = parse_amount(&amount)?;
            let sufficient = ctx.ledger.check_sufficient(&number, amount)?;
            if json {
                return output::json(json!({
                    "account_number": number,
                    "amount": amount,
                    "sufficient": sufficient,
                }));
            }
            if sufficient {
                output::success(&format!("{} covers {}", number, format_money(amount)));
            } else {
                output::warning(&format!(
                    "{} cannot cover {} (or does not exist)",
                    number,
                    format_money(amount)
                ));
            }
        }
        AccountCommands::Debit { number, amount } => {
            let account = ctx.ledger.debit(&number, parse_amount(&amount)?)?;
            if json {
                return output::json(account.balance());
            }
            output::success(&format!(
                "Debited {}; available {}",
                number,
                format_money(account.available_balance)
            ));
        }
        AccountCommands::Credit { number, amount } => {
            let account = ctx.ledger.credit(&number, parse_amount(&amount)?)?;
            if json {
                return output::json(account.balance());
            }
            output::success(&format!(
                "Credited {}; available {}",
                number,
                format_money(account.available_balance)
            ));
        }
        AccountCommands::SetBalance {
            number,
            clear,
            available,
            force,
        } => {
            let clear = parse_amount(&clear)?;
            let available = match available {
                Some(a) => parse_amount(&a)?,
                None => clear,
            };
            if !confirm(
                &format!(
                    "Overwrite balances of {} to clear {} / available {}?",
                    number,
                    format_money(clear),
                    format_money(available)
                ),
                force,
                json,
            )? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            let account = ctx.ledger.set_balances(&number, clear, available)?;
            if json {
                return output::json(account.balance());
            }
            output::success(&format!("Balances of {} overwritten", number));
        }
        AccountCommands::Deactivate { number, force } => {
            if !confirm(
                &format!("Deactivate account {}? Debits and credits will be refused.", number),
                force,
                json,
            )? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            let account = ctx.ledger.deactivate(&number)?;
            if json {
                return output::json(&account);
            }
            output::success(&format!("Account {} deactivated", number));
        }
        AccountCommands::Rename { number, name } => {
            let id = ctx.account_service.get_by_number(&number)?.id;
            let account = ctx.account_service.update(
                id,
                AccountUpdate {
                    account_name: Some(name),
                },
            )?;
            if json {
                return output::json(&account);
            }
            output::success(&format!("Account {} is now '{}'", number, account.account_name));
        }
    }

    Ok(())
}

fn print_account(a: &Account) {
    println!("{}", a.account_name.bold());
    let mut table = output::create_table();
    table.add_row(vec!["Number".to_string(), a.account_number.clone()]);
    table.add_row(vec!["Customer ID".to_string(), a.customer_id.to_string()]);
    table.add_row(vec!["Type".to_string(), a.account_type.clone()]);
    table.add_row(vec!["Currency".to_string(), a.currency_code.clone()]);
    table.add_row(vec!["Clear".to_string(), format_money(a.clear_balance)]);
    table.add_row(vec!["Available".to_string(), format_money(a.available_balance)]);
    table.add_row(vec!["Active".to_string(), a.is_active.to_string()]);
    table.add_row(vec![
        "Opened".to_string(),
        a.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    ]);
    println!("{}", table);
}
