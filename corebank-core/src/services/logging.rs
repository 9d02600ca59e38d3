//! Logging service - persisted operational event log
//!
//! Events go to `logs.duckdb` in the data directory, separate from the
//! ledger database. Only event names, command names and error text are
//! stored: never amounts, balances or customer details.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::log_migrations::LOG_MIGRATIONS;
use crate::services::MigrationService;

const LOG_DB_FILE: &str = "logs.duckdb";

/// A log event to be recorded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Self::default()
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Attach a library error: its kind and message
    pub fn with_error(mut self, error: &Error) -> Self {
        self.error_kind = Some(error.kind().to_string());
        self.error_message = Some(error.to_string());
        self
    }

    /// Attach an error that did not come from the library
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// A stored log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub logged_at: DateTime<Utc>,
    pub app_version: String,
    pub event: String,
    pub command: Option<String>,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
}

pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    app_version: String,
}

impl LoggingService {
    /// Open or create `logs.duckdb` in `data_dir`
    pub fn new(data_dir: &Path, app_version: impl Into<String>) -> Result<Self> {
        let db_path = data_dir.join(LOG_DB_FILE);
        let conn = Connection::open(&db_path)?;
        MigrationService::new(&conn, LOG_MIGRATIONS).run_pending()?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            app_version: app_version.into(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("log connection lock poisoned: {}", e)))
    }

    pub fn log(&self, event: LogEvent) -> Result<()> {
        let conn = self.lock()?;
        let logged_at = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S%.6f").to_string();
        conn.execute(
            "INSERT INTO sys_logs (id, logged_at, app_version, event, command, error_kind, error_message)
             VALUES (nextval('seq_log_id'), CAST(? AS TIMESTAMP), ?, ?, ?, ?, ?)",
            params![
                logged_at,
                &self.app_version,
                &event.event,
                &event.command,
                &event.error_kind,
                &event.error_message,
            ],
        )?;
        Ok(())
    }

    pub fn log_command(&self, command: &str) -> Result<()> {
        self.log(LogEvent::new("command_executed").with_command(command))
    }

    pub fn log_error(&self, command: &str, error: &Error) -> Result<()> {
        self.log(
            LogEvent::new("command_failed")
                .with_command(command)
                .with_error(error),
        )
    }

    /// Most recent entries first; `errors_only` keeps entries carrying an error
    pub fn recent(&self, limit: usize, errors_only: bool) -> Result<Vec<LogEntry>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT id, logged_at::VARCHAR, app_version, event, command, error_kind, error_message
             FROM sys_logs {}
             ORDER BY logged_at DESC, id DESC
             LIMIT ?",
            if errors_only {
                "WHERE error_message IS NOT NULL"
            } else {
                ""
            }
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            let logged_at: String = row.get(1)?;
            Ok((
                row.get::<_, i64>(0)?,
                logged_at,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<String>>(6)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, logged_at, app_version, event, command, error_kind, error_message) = row?;
            entries.push(LogEntry {
                id,
                logged_at: parse_logged_at(&logged_at)?,
                app_version,
                event,
                command,
                error_kind,
                error_message,
            });
        }
        Ok(entries)
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.lock()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM sys_logs", [], |row| row.get(0))?)
    }

    /// Delete entries logged before `cutoff`; returns how many went
    pub fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let conn = self.lock()?;
        let cutoff = cutoff.naive_utc().format("%Y-%m-%d %H:%M:%S%.6f").to_string();
        Ok(conn.execute(
            "DELETE FROM sys_logs WHERE logged_at < CAST(? AS TIMESTAMP)",
            params![cutoff],
        )?)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

fn parse_logged_at(s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::database(format!("invalid log timestamp '{}': {}", s, e)))
}
