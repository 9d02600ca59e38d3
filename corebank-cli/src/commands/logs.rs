//! Logs command - view and manage the operational log

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use super::{confirm, get_data_dir};
use crate::output;
use corebank_core::services::LoggingService;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only errors
        #[arg(long)]
        errors: bool,
    },
    /// Clear old log entries
    Clear {
        /// Delete logs older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u32,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

impl LogsCommands {
    pub fn name(&self) -> &'static str {
        match self {
            LogsCommands::List { .. } => "list",
            LogsCommands::Clear { .. } => "clear",
        }
    }
}

fn get_logging_service() -> Result<LoggingService> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    Ok(LoggingService::new(&data_dir, env!("CARGO_PKG_VERSION"))?)
}

pub fn run(command: LogsCommands, json: bool) -> Result<()> {
    let service = get_logging_service()?;

    match command {
        LogsCommands::List { limit, errors } => {
            let entries = service.recent(limit, errors)?;
            if json {
                return output::json(&entries);
            }
            if entries.is_empty() {
                println!("No log entries found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Time", "Version", "Event", "Command", "Error"]);
            for entry in &entries {
                let error = match (&entry.error_kind, &entry.error_message) {
                    (Some(kind), Some(msg)) => format!("{}: {}", kind, msg).red().to_string(),
                    (None, Some(msg)) => msg.red().to_string(),
                    _ => String::new(),
                };
                table.add_row(vec![
                    entry.logged_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    entry.app_version.clone(),
                    entry.event.clone(),
                    entry.command.clone().unwrap_or_default(),
                    error,
                ]);
            }
            println!("{}", table);
            println!();
            println!("{}", format!("Log database: {}", service.db_path().display()).dimmed());
        }
        LogsCommands::Clear {
            older_than_days,
            force,
        } => {
            if !confirm(
                &format!("Delete logs older than {} days?", older_than_days),
                force,
                json,
            )? {
                println!("Cancelled.");
                return Ok(());
            }

            let cutoff = Utc::now() - Duration::days(i64::from(older_than_days));
            let deleted = service.delete_before(cutoff)?;
            if json {
                return output::json(json!({ "deleted": deleted }));
            }
            println!("Deleted {} log entries", deleted);
        }
    }

    Ok(())
}
