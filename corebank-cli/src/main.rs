//! corebank CLI - operate the banking core from a terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use corebank_core::services::LogEvent;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{account, customer, logs, seed, status, tx};

/// cbk - customers, accounts and the ledger behind them
#[derive(Parser)]
#[command(name = "cbk", version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Print debug logs to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register customers and track their logins
    Customer {
        #[command(subcommand)]
        command: customer::CustomerCommands,
    },

    /// Open accounts and move their balances
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },

    /// Payments and the transaction log
    Tx {
        #[command(subcommand)]
        command: tx::TxCommands,
    },

    /// Show store-wide counts and totals
    Status,

    /// Load a small demo data set
    Seed,

    /// View and manage the operational log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> String {
        match self {
            Commands::Customer { command } => format!("customer {}", command.name()),
            Commands::Account { command } => format!("account {}", command.name()),
            Commands::Tx { command } => format!("tx {}", command.name()),
            Commands::Status => "status".to_string(),
            Commands::Seed => "seed".to_string(),
            Commands::Logs { command } => format!("logs {}", command.name()),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json;
    let command_name = cli.command.name();
    let logger = commands::get_logger();
    commands::log_event(
        &logger,
        LogEvent::new("command_executed").with_command(&command_name),
    );

    match run(cli.command, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let event = LogEvent::new("command_failed").with_command(&command_name);
            let event = match e.downcast_ref::<corebank_core::Error>() {
                Some(core_error) => event.with_error(core_error),
                None => event.with_error_message(format!("{:#}", e)),
            };
            commands::log_event(&logger, event);

            if json {
                output::json_error(&e);
            } else {
                output::error(&format!("Error: {:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "corebank_core=debug,cbk=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Customer { command } => customer::run(command, json),
        Commands::Account { command } => account::run(command, json),
        Commands::Tx { command } => tx::run(command, json),
        Commands::Status => status::run(json),
        Commands::Seed => seed::run(json),
        Commands::Logs { command } => logs::run(command, json),
    }
}
