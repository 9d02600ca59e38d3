//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use duckdb::{params, Connection, Row};
use rust_decimal::Decimal;

use crate::domain::money::to_money;
use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, AccountKey, Customer, CustomerKey, NewAccount, NewCustomer, NewTransaction,
    Transaction, TransactionKind, TransactionQuery, TransactionStatus,
};
use crate::migrations::MIGRATIONS;
use crate::ports::{Mutation, Repository, StoreSummary};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of attempts when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const CUSTOMER_COLUMNS: &str = "id, customer_name, username, email, phone, cif_number,
    failed_login_attempts::BIGINT, is_locked, last_login::VARCHAR, created_at::VARCHAR, updated_at::VARCHAR";

const ACCOUNT_COLUMNS: &str = "id, account_number, customer_id, account_name, account_type,
    currency_code, clear_balance::VARCHAR, available_balance::VARCHAR, is_active,
    created_at::VARCHAR, updated_at::VARCHAR";

const TRANSACTION_COLUMNS: &str = "id, customer_id, transaction_type, amount::VARCHAR,
    from_account_number, to_account_number, status, description,
    transaction_date::VARCHAR, created_at::VARCHAR";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock on file")
        || lower.contains("file is already open")
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        let msg = err.to_string();
        if msg.contains("Duplicate key") || msg.contains("unique constraint") {
            Error::Conflict(msg)
        } else {
            Error::Database(msg)
        }
    }
}

/// DuckDB-backed store for customers, accounts and transactions
///
/// One connection behind a mutex. Every `update_*` call runs its
/// read-modify-write inside a DuckDB transaction while holding the mutex,
/// so two writers can never interleave on the same row.
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) the database file and bring its schema up to date
    ///
    /// Retries with exponential backoff while another process holds the
    /// file lock.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut attempt = 0;
        let conn = loop {
            match Self::try_open_connection(db_path) {
                Ok(conn) => break conn,
                Err(e) if attempt + 1 < MAX_RETRIES && is_retryable_error(&e.to_string()) => {
                    let delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                    tracing::warn!(
                        path = %db_path.display(),
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "database busy, retrying"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        let repo = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path.to_path_buf()),
        };
        repo.ensure_schema()?;
        Ok(repo)
    }

    /// Fresh in-memory database with the full schema, mainly for tests
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let repo = Self {
            conn: Mutex::new(Connection::open_in_memory_with_flags(config)?),
            db_path: None,
        };
        repo.ensure_schema()?;
        Ok(repo)
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off; nothing here needs one.
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    /// Apply pending schema migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn, MIGRATIONS).run_pending()
    }

    pub fn ensure_schema(&self) -> Result<()> {
        let result = self.run_migrations()?;
        if !result.applied.is_empty() {
            tracing::info!(applied = ?result.applied, "database schema migrated");
        }
        Ok(())
    }

    /// Migrations embedded in this build but not yet applied
    pub fn pending_migrations(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        MigrationService::new(&conn, MIGRATIONS).pending()
    }

    /// Path of the backing file, `None` when in memory
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("connection lock poisoned: {}", e)))
    }

    /// Run `f` inside a DuckDB transaction; commits only when `f` succeeds
    fn with_transaction<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        // Dropping an uncommitted transaction rolls it back.
        let out = f(&*tx)?;
        tx.commit()?;
        Ok(out)
    }
}

// === Row mapping ===

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> duckdb::Result<DateTime<Utc>> {
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| conversion_error(format!("invalid timestamp: {}", s)))
}

fn parse_decimal(s: &str) -> duckdb::Result<Decimal> {
    Decimal::from_str(s)
        .ok()
        .and_then(|d| to_money(d).ok())
        .ok_or_else(|| conversion_error(format!("invalid amount: {}", s)))
}

fn conversion_error(msg: String) -> duckdb::Error {
    duckdb::Error::FromSqlConversionFailure(
        0,
        duckdb::types::Type::Text,
        Box::new(Error::Database(msg)),
    )
}

/// Timestamps are stored at microsecond precision
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn row_to_customer(row: &Row) -> duckdb::Result<Customer> {
    let attempts: i64 = row.get(6)?;
    let last_login: Option<String> = row.get(8)?;
    Ok(Customer {
        id: row.get(0)?,
        customer_name: row.get(1)?,
        username: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        cif_number: row.get(5)?,
        failed_login_attempts: u32::try_from(attempts).unwrap_or_default(),
        is_locked: row.get(7)?,
        last_login: last_login.as_deref().map(parse_timestamp).transpose()?,
        created_at: parse_timestamp(&row.get::<_, String>(9)?)?,
        updated_at: parse_timestamp(&row.get::<_, String>(10)?)?,
    })
}

fn row_to_account(row: &Row) -> duckdb::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        account_number: row.get(1)?,
        customer_id: row.get(2)?,
        account_name: row.get(3)?,
        account_type: row.get(4)?,
        currency_code: row.get(5)?,
        clear_balance: parse_decimal(&row.get::<_, String>(6)?)?,
        available_balance: parse_decimal(&row.get::<_, String>(7)?)?,
        is_active: row.get(8)?,
        created_at: parse_timestamp(&row.get::<_, String>(9)?)?,
        updated_at: parse_timestamp(&row.get::<_, String>(10)?)?,
    })
}

fn row_to_transaction(row: &Row) -> duckdb::Result<Transaction> {
    let kind: String = row.get(2)?;
    let status: String = row.get(6)?;
    Ok(Transaction {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        kind: TransactionKind::from_str(&kind)
            .map_err(|e| conversion_error(e.to_string()))?,
        amount: parse_decimal(&row.get::<_, String>(3)?)?,
        from_account_number: row.get(4)?,
        to_account_number: row.get(5)?,
        status: TransactionStatus::from_str(&status)
            .map_err(|e| conversion_error(e.to_string()))?,
        description: row.get(7)?,
        transaction_date: parse_timestamp(&row.get::<_, String>(8)?)?,
        created_at: parse_timestamp(&row.get::<_, String>(9)?)?,
    })
}

// === Single-row lookups shared by reads and updates ===

fn select_customer(conn: &Connection, key: &CustomerKey) -> Result<Option<Customer>> {
    let (column, value): (&str, Box<dyn duckdb::ToSql>) = match key {
        CustomerKey::Id(id) => ("id", Box::new(*id)),
        CustomerKey::Username(username) => ("username", Box::new(username.clone())),
        CustomerKey::Email(email) => ("email", Box::new(email.clone())),
        CustomerKey::Cif(cif) => ("cif_number", Box::new(cif.clone())),
    };
    let sql = format!(
        "SELECT {} FROM sys_customers WHERE {} = ?",
        CUSTOMER_COLUMNS, column
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(&[value.as_ref()][..])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_customer(row)?)),
        None => Ok(None),
    }
}

fn select_account(conn: &Connection, key: &AccountKey) -> Result<Option<Account>> {
    let (column, value): (&str, Box<dyn duckdb::ToSql>) = match key {
        AccountKey::Id(id) => ("id", Box::new(*id)),
        AccountKey::Number(number) => ("account_number", Box::new(number.clone())),
    };
    let sql = format!(
        "SELECT {} FROM sys_accounts WHERE {} = ?",
        ACCOUNT_COLUMNS, column
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(&[value.as_ref()][..])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_account(row)?)),
        None => Ok(None),
    }
}

fn select_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let sql = format!(
        "SELECT {} FROM sys_transactions WHERE id = ?",
        TRANSACTION_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_transaction(row)?)),
        None => Ok(None),
    }
}

fn next_id(conn: &Connection, sequence: &str) -> Result<i64> {
    Ok(conn.query_row(&format!("SELECT nextval('{}')", sequence), [], |row| {
        row.get(0)
    })?)
}

impl Repository for DuckDbRepository {
    // === Customers ===

    fn find_customer(&self, key: &CustomerKey) -> Result<Option<Customer>> {
        let conn = self.lock()?;
        select_customer(&conn, key)
    }

    fn list_customers(&self, skip: usize, limit: usize) -> Result<Vec<Customer>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM sys_customers ORDER BY id LIMIT ? OFFSET ?",
            CUSTOMER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64, skip as i64], row_to_customer)?;
        let mut customers = Vec::new();
        for customer in rows {
            customers.push(customer?);
        }
        Ok(customers)
    }

    fn insert_customer(&self, new: &NewCustomer) -> Result<Customer> {
        self.with_transaction(|conn| {
            if select_customer(conn, &CustomerKey::Username(new.username.clone()))?.is_some() {
                return Err(Error::conflict(format!(
                    "username {} already registered",
                    new.username
                )));
            }
            if select_customer(conn, &CustomerKey::Email(new.email.clone()))?.is_some() {
                return Err(Error::conflict(format!(
                    "email {} already registered",
                    new.email
                )));
            }
            if select_customer(conn, &CustomerKey::Cif(new.cif_number.clone()))?.is_some() {
                return Err(Error::conflict(format!(
                    "CIF number {} already registered",
                    new.cif_number
                )));
            }

            let now = now();
            let customer = Customer {
                id: next_id(conn, "seq_customer_id")?,
                customer_name: new.customer_name.clone(),
                username: new.username.clone(),
                email: new.email.clone(),
                phone: new.phone.clone(),
                cif_number: new.cif_number.clone(),
                failed_login_attempts: 0,
                is_locked: false,
                last_login: None,
                created_at: now,
                updated_at: now,
            };
            conn.execute(
                "INSERT INTO sys_customers (id, customer_name, username, email, phone, cif_number,
                    failed_login_attempts, is_locked, last_login, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, 0, FALSE, NULL, CAST(? AS TIMESTAMP), CAST(? AS TIMESTAMP))",
                params![
                    customer.id,
                    &customer.customer_name,
                    &customer.username,
                    &customer.email,
                    &customer.phone,
                    &customer.cif_number,
                    format_timestamp(&now),
                    format_timestamp(&now),
                ],
            )?;
            Ok(customer)
        })
    }

    fn update_customer(
        &self,
        id: i64,
        mutate: Mutation<'_, Customer>,
    ) -> Result<Option<Customer>> {
        self.with_transaction(|conn| {
            let Some(current) = select_customer(conn, &CustomerKey::Id(id))? else {
                return Ok(None);
            };

            let mut draft = current.clone();
            mutate(&mut draft)?;
            draft.id = current.id;
            draft.username = current.username.clone();
            draft.cif_number = current.cif_number.clone();
            draft.created_at = current.created_at;
            draft.updated_at = now();

            // Unique column: only written when it actually changes.
            let email_changed = draft.email != current.email;
            if email_changed
                && select_customer(conn, &CustomerKey::Email(draft.email.clone()))?.is_some()
            {
                return Err(Error::conflict(format!(
                    "email {} already registered",
                    draft.email
                )));
            }

            let sql = format!(
                "UPDATE sys_customers SET customer_name = ?, phone = ?,
                    failed_login_attempts = ?, is_locked = ?,
                    last_login = CAST(? AS TIMESTAMP), updated_at = CAST(? AS TIMESTAMP){}
                 WHERE id = ?",
                if email_changed { ", email = ?" } else { "" }
            );
            let mut params: Vec<Box<dyn duckdb::ToSql>> = vec![
                Box::new(draft.customer_name.clone()),
                Box::new(draft.phone.clone()),
                Box::new(i64::from(draft.failed_login_attempts)),
                Box::new(draft.is_locked),
                Box::new(draft.last_login.as_ref().map(format_timestamp)),
                Box::new(format_timestamp(&draft.updated_at)),
            ];
            if email_changed {
                params.push(Box::new(draft.email.clone()));
            }
            params.push(Box::new(id));

            let param_refs: Vec<&dyn duckdb::ToSql> = params.iter().map(|p| p.as_ref()).collect();
            conn.execute(&sql, param_refs.as_slice())?;

            Ok(Some(draft))
        })
    }

    // === Accounts ===

    fn find_account(&self, key: &AccountKey) -> Result<Option<Account>> {
        let conn = self.lock()?;
        select_account(&conn, key)
    }

    fn list_accounts_by_customer(
        &self,
        customer_id: i64,
        active_only: bool,
    ) -> Result<Vec<Account>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM sys_accounts WHERE customer_id = ? {} ORDER BY id",
            ACCOUNT_COLUMNS,
            if active_only { "AND is_active" } else { "" }
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![customer_id], row_to_account)?;
        let mut accounts = Vec::new();
        for account in rows {
            accounts.push(account?);
        }
        Ok(accounts)
    }

    fn insert_account(&self, new: &NewAccount) -> Result<Account> {
        self.with_transaction(|conn| {
            if select_account(conn, &AccountKey::Number(new.account_number.clone()))?.is_some() {
                return Err(Error::conflict(format!(
                    "account number {} already registered",
                    new.account_number
                )));
            }

            let now = now();
            let account = Account {
                id: next_id(conn, "seq_account_id")?,
                account_number: new.account_number.clone(),
                customer_id: new.customer_id,
                account_name: new.account_name.clone(),
                account_type: new.account_type.clone(),
                currency_code: new.currency_code.clone(),
                clear_balance: new.opening_balance,
                available_balance: new.opening_balance,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            conn.execute(
                "INSERT INTO sys_accounts (id, account_number, customer_id, account_name,
                    account_type, currency_code, clear_balance, available_balance, is_active,
                    created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, CAST(? AS DECIMAL(18, 2)), CAST(? AS DECIMAL(18, 2)),
                    TRUE, CAST(? AS TIMESTAMP), CAST(? AS TIMESTAMP))",
                params![
                    account.id,
                    &account.account_number,
                    account.customer_id,
                    &account.account_name,
                    &account.account_type,
                    &account.currency_code,
                    account.clear_balance.to_string(),
                    account.available_balance.to_string(),
                    format_timestamp(&now),
                    format_timestamp(&now),
                ],
            )?;
            Ok(account)
        })
    }

    fn update_account(
        &self,
        key: &AccountKey,
        mutate: Mutation<'_, Account>,
    ) -> Result<Option<Account>> {
        self.with_transaction(|conn| {
            let Some(current) = select_account(conn, key)? else {
                return Ok(None);
            };

            let mut draft = current.clone();
            mutate(&mut draft)?;
            draft.id = current.id;
            draft.account_number = current.account_number;
            draft.customer_id = current.customer_id;
            draft.account_type = current.account_type;
            draft.currency_code = current.currency_code;
            draft.created_at = current.created_at;
            draft.updated_at = now();

            conn.execute(
                "UPDATE sys_accounts SET account_name = ?,
                    clear_balance = CAST(? AS DECIMAL(18, 2)),
                    available_balance = CAST(? AS DECIMAL(18, 2)),
                    is_active = ?, updated_at = CAST(? AS TIMESTAMP)
                 WHERE id = ?",
                params![
                    &draft.account_name,
                    draft.clear_balance.to_string(),
                    draft.available_balance.to_string(),
                    draft.is_active,
                    format_timestamp(&draft.updated_at),
                    draft.id,
                ],
            )?;
            Ok(Some(draft))
        })
    }

    // === Transactions ===

    fn find_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.lock()?;
        select_transaction(&conn, id)
    }

    fn query_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        let conn = self.lock()?;

        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn duckdb::ToSql>> = Vec::new();

        if let Some(customer_id) = query.customer_id {
            conditions.push("customer_id = ?");
            params.push(Box::new(customer_id));
        }
        if let Some(number) = &query.account_number {
            conditions.push("(from_account_number = ? OR to_account_number = ?)");
            params.push(Box::new(number.clone()));
            params.push(Box::new(number.clone()));
        }
        if let Some(kind) = &query.kind {
            conditions.push("transaction_type = ?");
            params.push(Box::new(kind.code().to_string()));
        }
        if let Some(status) = query.status {
            conditions.push("status = ?");
            params.push(Box::new(status.as_str().to_string()));
        }
        if let Some(start) = &query.start {
            conditions.push("transaction_date >= CAST(? AS TIMESTAMP)");
            params.push(Box::new(format_timestamp(start)));
        }
        if let Some(end) = &query.end {
            conditions.push("transaction_date <= CAST(? AS TIMESTAMP)");
            params.push(Box::new(format_timestamp(end)));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM sys_transactions {} ORDER BY transaction_date DESC, id DESC LIMIT ? OFFSET ?",
            TRANSACTION_COLUMNS, where_clause
        );
        params.push(Box::new(query.limit as i64));
        params.push(Box::new(query.skip as i64));

        let param_refs: Vec<&dyn duckdb::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(param_refs.as_slice())?;

        let mut transactions = Vec::new();
        while let Some(row) = rows.next()? {
            transactions.push(row_to_transaction(row)?);
        }
        Ok(transactions)
    }

    fn insert_transaction(&self, new: &NewTransaction) -> Result<Transaction> {
        self.with_transaction(|conn| {
            let now = now();
            let tx = Transaction {
                id: next_id(conn, "seq_transaction_id")?,
                customer_id: new.customer_id,
                kind: new.kind.clone(),
                amount: new.amount,
                from_account_number: new.from_account_number.clone(),
                to_account_number: new.to_account_number.clone(),
                status: new.status,
                description: new.description.clone(),
                transaction_date: new
                    .transaction_date
                    .map(|d| d.trunc_subsecs(6))
                    .unwrap_or(now),
                created_at: now,
            };
            conn.execute(
                "INSERT INTO sys_transactions (id, customer_id, transaction_type, amount,
                    from_account_number, to_account_number, status, description,
                    transaction_date, created_at)
                 VALUES (?, ?, ?, CAST(? AS DECIMAL(18, 2)), ?, ?, ?, ?,
                    CAST(? AS TIMESTAMP), CAST(? AS TIMESTAMP))",
                params![
                    tx.id,
                    tx.customer_id,
                    tx.kind.code(),
                    tx.amount.to_string(),
                    &tx.from_account_number,
                    &tx.to_account_number,
                    tx.status.as_str(),
                    &tx.description,
                    format_timestamp(&tx.transaction_date),
                    format_timestamp(&tx.created_at),
                ],
            )?;
            Ok(tx)
        })
    }

    fn update_transaction(
        &self,
        id: i64,
        mutate: Mutation<'_, Transaction>,
    ) -> Result<Option<Transaction>> {
        self.with_transaction(|conn| {
            let Some(current) = select_transaction(conn, id)? else {
                return Ok(None);
            };

            let mut draft = current.clone();
            mutate(&mut draft)?;

            conn.execute(
                "UPDATE sys_transactions SET status = ? WHERE id = ?",
                params![draft.status.as_str(), id],
            )?;
            Ok(Some(Transaction {
                status: draft.status,
                ..current
            }))
        })
    }

    // === Reporting ===

    fn summary(&self) -> Result<StoreSummary> {
        let conn = self.lock()?;
        let (customers, locked_customers): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_locked) FROM sys_customers",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let (accounts, active_accounts, total): (i64, i64, String) = conn.query_row(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active),
                    COALESCE(SUM(clear_balance), 0)::VARCHAR
             FROM sys_accounts",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        let transactions: i64 =
            conn.query_row("SELECT COUNT(*) FROM sys_transactions", [], |row| row.get(0))?;

        Ok(StoreSummary {
            customers,
            locked_customers,
            accounts,
            active_accounts,
            transactions,
            total_clear_balance: Decimal::from_str(&total).map_err(|e| {
                Error::database(format!("invalid balance total '{}': {}", total, e))
            })?,
        })
    }
}
