//! Customer commands - registration, profile and login state

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::{confirm, get_context, resolve_customer};
use crate::output;
use corebank_core::{Customer, CustomerUpdate, NewCustomer};

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Register a new customer
    Register {
        /// Full name
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        /// Customer information file number
        #[arg(long)]
        cif: String,
    },
    /// Show one customer (id or username)
    Show { customer: String },
    /// List customers by id
    List {
        #[arg(long, default_value = "0")]
        skip: usize,
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Change name, email or phone
    Update {
        customer: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Clear the lock and the failed-login counter
    Unlock {
        customer: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Record a failed login
    Fail { customer: String },
    /// Record a successful login
    Success { customer: String },
}

impl CustomerCommands {
    pub fn name(&self) -> &'static str {
        match self {
            CustomerCommands::Register { .. } => "register",
            CustomerCommands::Show { .. } => "show",
            CustomerCommands::List { .. } => "list",
            CustomerCommands::Update { .. } => "update",
            CustomerCommands::Unlock { .. } => "unlock",
            CustomerCommands::Fail { .. } => "fail",
            CustomerCommands::Success { .. } => "success",
        }
    }
}

pub fn run(command: CustomerCommands, json: bool) -> Result<()> {
    let ctx = get_context()?;

    match command {
        CustomerCommands::Register {
            name,
            username,
            email,
            phone,
            cif,
        } => {
            let customer = ctx.customer_service.register(NewCustomer {
                customer_name: name,
                username,
                email,
                phone,
                cif_number: cif,
            })?;
            if json {
                return output::json(&customer);
            }
            output::success(&format!(
                "Registered {} (id {})",
                customer.username, customer.id
            ));
        }
        CustomerCommands::Show { customer } => {
            let customer = resolve_customer(&ctx, &customer)?;
            if json {
                return output::json(&customer);
            }
            print_customer(&customer);
        }
        CustomerCommands::List { skip, limit } => {
            let customers = ctx.customer_service.list(skip, limit)?;
            if json {
                return output::json(&customers);
            }
            if customers.is_empty() {
                println!("No customers found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["ID", "Username", "Name", "CIF", "Email", "Locked"]);
            for c in &customers {
                table.add_row(vec![
                    c.id.to_string(),
                    c.username.clone(),
                    c.customer_name.clone(),
                    c.cif_number.clone(),
                    c.email.clone(),
                    lock_label(c),
                ]);
            }
            println!("{}", table);
        }
        CustomerCommands::Update {
            customer,
            name,
            email,
            phone,
        } => {
            let id = resolve_customer(&ctx, &customer)?.id;
            let updated = ctx.customer_service.update(
                id,
                CustomerUpdate {
                    customer_name: name,
                    email,
                    phone,
                },
            )?;
            if json {
                return output::json(&updated);
            }
            output::success(&format!("Updated {}", updated.username));
        }
        CustomerCommands::Unlock { customer, force } => {
            let target = resolve_customer(&ctx, &customer)?;
            if !confirm(
                &format!("Unlock {} and reset failed logins?", target.username),
                force,
                json,
            )? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            let unlocked = ctx.login_guard.unlock(target.id)?;
            if json {
                return output::json(&unlocked);
            }
            output::success(&format!("Unlocked {}", unlocked.username));
        }
        CustomerCommands::Fail { customer } => {
            let id = resolve_customer(&ctx, &customer)?.id;
            let attempt = ctx.login_guard.record_failure(id)?;
            if json {
                return output::json(&attempt);
            }
            if attempt.is_locked {
                output::warning(&format!(
                    "Customer {} is locked after {} failed logins",
                    id, attempt.failed_login_attempts
                ));
            } else {
                output::info(&format!(
                    "Failed login {} of {} recorded",
                    attempt.failed_login_attempts,
                    ctx.login_guard.threshold()
                ));
            }
        }
        CustomerCommands::Success { customer } => {
            let id = resolve_customer(&ctx, &customer)?.id;
            let customer = ctx.login_guard.record_success(id)?;
            if json {
                return output::json(&customer);
            }
            if customer.is_locked {
                output::warning(&format!(
                    "Login recorded, but {} stays locked until unlocked",
                    customer.username
                ));
            } else {
                output::success(&format!("Login recorded for {}", customer.username));
            }
        }
    }

    Ok(())
}

fn lock_label(customer: &Customer) -> String {
    if customer.is_locked {
        "locked".red().to_string()
    } else {
        String::new()
    }
}

fn print_customer(c: &Customer) {
    println!("{}", c.customer_name.bold());
    let mut table = output::create_table();
    table.add_row(vec!["ID".to_string(), c.id.to_string()]);
    table.add_row(vec!["Username".to_string(), c.username.clone()]);
    table.add_row(vec!["Email".to_string(), c.email.clone()]);
    table.add_row(vec!["Phone".to_string(), c.phone.clone()]);
    table.add_row(vec!["CIF".to_string(), c.cif_number.clone()]);
    table.add_row(vec![
        "Failed logins".to_string(),
        c.failed_login_attempts.to_string(),
    ]);
    table.add_row(vec!["Locked".to_string(), c.is_locked.to_string()]);
    table.add_row(vec![
        "Last login".to_string(),
        c.last_login
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string()),
    ]);
    println!("{}", table);
}
