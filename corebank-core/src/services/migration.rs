//! Migration service - applies embedded SQL migrations
//!
//! Works over any migration set whose first entry creates `sys_migrations`.
//! Each migration runs at most once per database file.

use duckdb::Connection;
use serde::Serialize;

use crate::domain::result::Result;
use crate::migrations::BOOTSTRAP;

/// Outcome of a migration run
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationResult {
    /// Migrations applied by this run, in order
    pub applied: Vec<String>,
    /// Migrations that were already recorded before this run
    pub already_applied: usize,
}

pub struct MigrationService<'a> {
    conn: &'a Connection,
    migrations: &'static [(&'static str, &'static str)],
}

impl<'a> MigrationService<'a> {
    pub fn new(conn: &'a Connection, migrations: &'static [(&'static str, &'static str)]) -> Self {
        Self { conn, migrations }
    }

    /// Apply every migration not yet recorded
    pub fn run_pending(&self) -> Result<MigrationResult> {
        let mut result = MigrationResult::default();

        if !self.bookkeeping_exists()? {
            if let Some((name, sql)) = self.migrations.iter().find(|(n, _)| *n == BOOTSTRAP) {
                self.apply(name, sql)?;
                result.applied.push(name.to_string());
            }
        }

        let recorded = self.applied()?;
        result.already_applied = recorded.len() - result.applied.len();

        for (name, sql) in self.migrations {
            if recorded.iter().any(|r| r == name) {
                continue;
            }
            self.apply(name, sql)?;
            result.applied.push(name.to_string());
            tracing::debug!(migration = %name, "applied migration");
        }

        Ok(result)
    }

    /// Names of recorded migrations, sorted
    pub fn applied(&self) -> Result<Vec<String>> {
        if !self.bookkeeping_exists()? {
            return Ok(Vec::new());
        }
        let mut stmt = self
            .conn
            .prepare("SELECT migration_name FROM sys_migrations ORDER BY migration_name")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut names = Vec::new();
        for name in rows {
            names.push(name?);
        }
        Ok(names)
    }

    /// Names of embedded migrations not yet recorded
    pub fn pending(&self) -> Result<Vec<String>> {
        let applied = self.applied()?;
        Ok(self
            .migrations
            .iter()
            .map(|(name, _)| name.to_string())
            .filter(|name| !applied.contains(name))
            .collect())
    }

    fn bookkeeping_exists(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'sys_migrations'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Run one migration and record it in the same transaction
    fn apply(&self, name: &str, sql: &str) -> Result<()> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        let outcome = self.conn.execute_batch(sql).and_then(|_| {
            self.conn
                .execute("INSERT INTO sys_migrations (migration_name) VALUES (?)", [name])
        });
        match outcome {
            Ok(_) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(())
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::MIGRATIONS;

    #[test]
    fn test_fresh_database_applies_everything() {
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::new(&conn, MIGRATIONS);

        let result = service.run_pending().unwrap();
        assert_eq!(result.applied.len(), MIGRATIONS.len());
        assert_eq!(result.already_applied, 0);
        assert!(service.pending().unwrap().is_empty());
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::new(&conn, MIGRATIONS);
        service.run_pending().unwrap();

        let again = service.run_pending().unwrap();
        assert!(again.applied.is_empty());
        assert_eq!(again.already_applied, MIGRATIONS.len());
    }

    #[test]
    fn test_pending_before_bootstrap_lists_all() {
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::new(&conn, MIGRATIONS);
        assert_eq!(service.pending().unwrap().len(), MIGRATIONS.len());
        assert!(service.applied().unwrap().is_empty());
    }
}
