//! Transaction domain model

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::require_positive;
use super::result::{Error, Result};

/// Default page size for history queries
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Kind of money movement, stored as a short code
///
/// The set is open: unknown codes round-trip as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TransactionKind {
    Transfer,
    Withdrawal,
    Deposit,
    Other(String),
}

impl TransactionKind {
    pub fn code(&self) -> &str {
        match self {
            TransactionKind::Transfer => "TR",
            TransactionKind::Withdrawal => "WD",
            TransactionKind::Deposit => "DP",
            TransactionKind::Other(code) => code,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TransactionKind::Transfer => "Transfer",
            TransactionKind::Withdrawal => "Withdrawal",
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Other(code) => code,
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_uppercase();
        match code.as_str() {
            "TR" | "TRANSFER" => Ok(TransactionKind::Transfer),
            "WD" | "WITHDRAWAL" | "WITHDRAW" => Ok(TransactionKind::Withdrawal),
            "DP" | "DEPOSIT" => Ok(TransactionKind::Deposit),
            "" => Err(Error::invalid_argument("transaction type cannot be empty")),
            other if other.len() > 10 => Err(Error::invalid_argument(format!(
                "transaction type code too long: {}",
                other
            ))),
            other => Ok(TransactionKind::Other(other.to_string())),
        }
    }
}

impl From<TransactionKind> for String {
    fn from(kind: TransactionKind) -> Self {
        kind.code().to_string()
    }
}

impl TryFrom<String> for TransactionKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Lifecycle of a transaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Success => "SUCCESS",
            TransactionStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(TransactionStatus::Pending),
            "SUCCESS" => Ok(TransactionStatus::Success),
            "FAILED" => Ok(TransactionStatus::Failed),
            other => Err(Error::invalid_argument(format!(
                "unknown transaction status: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logged money movement
///
/// The amount is always positive; direction is carried by `kind` and by
/// which of `from_account_number` / `to_account_number` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub customer_id: i64,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub from_account_number: Option<String>,
    pub to_account_number: Option<String>,
    pub status: TransactionStatus,
    pub description: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Move a pending record to its final status. Happens at most once.
    pub fn transition(&mut self, status: TransactionStatus) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::conflict(format!(
                "transaction {} is already {}",
                self.id, self.status
            )));
        }
        if !status.is_terminal() {
            return Err(Error::conflict(format!(
                "transaction {} is already PENDING; it can only move to SUCCESS or FAILED",
                self.id
            )));
        }
        self.status = status;
        Ok(())
    }

    /// Whether the record touches `account_number` on either side
    pub fn involves(&self, account_number: &str) -> bool {
        self.from_account_number.as_deref() == Some(account_number)
            || self.to_account_number.as_deref() == Some(account_number)
    }
}

/// Fields accepted when recording a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub customer_id: i64,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub from_account_number: Option<String>,
    pub to_account_number: Option<String>,
    pub status: TransactionStatus,
    pub description: Option<String>,
    /// Defaults to the insert time
    pub transaction_date: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn new(customer_id: i64, kind: TransactionKind, amount: Decimal) -> Self {
        Self {
            customer_id,
            kind,
            amount,
            from_account_number: None,
            to_account_number: None,
            status: TransactionStatus::Success,
            description: None,
            transaction_date: None,
        }
    }

    pub fn from_account(mut self, number: impl Into<String>) -> Self {
        self.from_account_number = Some(number.into());
        self
    }

    pub fn to_account(mut self, number: impl Into<String>) -> Self {
        self.to_account_number = Some(number.into());
        self
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    /// Validate and normalize in place
    pub fn validate(&mut self) -> Result<()> {
        self.amount = require_positive(self.amount)?;

        let (needs_from, needs_to) = match self.kind {
            TransactionKind::Transfer => (true, true),
            TransactionKind::Withdrawal => (true, false),
            TransactionKind::Deposit => (false, true),
            TransactionKind::Other(_) => (false, false),
        };
        if needs_from && self.from_account_number.is_none() {
            return Err(Error::invalid_argument(format!(
                "{} requires a source account",
                self.kind.label()
            )));
        }
        if needs_to && self.to_account_number.is_none() {
            return Err(Error::invalid_argument(format!(
                "{} requires a destination account",
                self.kind.label()
            )));
        }
        Ok(())
    }
}

/// Filter for transaction history
///
/// Every set field narrows the result. Results are newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionQuery {
    pub customer_id: Option<i64>,
    /// Matches either side of the movement
    pub account_number: Option<String>,
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    /// Inclusive lower bound on `transaction_date`
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `transaction_date`
    pub end: Option<DateTime<Utc>>,
    pub skip: usize,
    pub limit: usize,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            customer_id: None,
            account_number: None,
            kind: None,
            status: None,
            start: None,
            end: None,
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl TransactionQuery {
    pub fn for_customer(customer_id: i64) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Self::default()
        }
    }

    pub fn for_account(account_number: impl Into<String>) -> Self {
        Self {
            account_number: Some(account_number.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::invalid_argument("limit must be at least 1"));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(Error::invalid_argument(
                    "start date must not be after end date",
                ));
            }
        }
        Ok(())
    }

    /// Whether `tx` passes every filter (pagination aside)
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.customer_id.map_or(true, |id| tx.customer_id == id)
            && self
                .account_number
                .as_deref()
                .map_or(true, |number| tx.involves(number))
            && self.kind.as_ref().map_or(true, |kind| &tx.kind == kind)
            && self.status.map_or(true, |status| tx.status == status)
            && self.start.map_or(true, |start| tx.transaction_date >= start)
            && self.end.map_or(true, |end| tx.transaction_date <= end)
    }
}
