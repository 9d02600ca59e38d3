//! Result and error types for the core library

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Business outcomes (`NotFound`, `InvalidArgument`, `InsufficientFunds`,
/// `Conflict`, `AccountInactive`, `Forbidden`) are terminal for the caller.
/// Only `Database` reflects a store-side condition that may succeed on retry.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(
        "Insufficient funds in account {account_number}: available {available}, requested {requested}"
    )]
    InsufficientFunds {
        account_number: String,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Account inactive: {0}")]
    AccountInactive(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::InsufficientFunds { .. } => "insufficient_funds",
            Error::Conflict(_) => "conflict",
            Error::AccountInactive(_) => "account_inactive",
            Error::Forbidden(_) => "forbidden",
            Error::Database(_) => "database",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Other(_) => "other",
        }
    }

    /// Whether a caller may reasonably retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Database(_))
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
            context: None,
        }
    }

    /// Create a successful result with context
    pub fn ok_with_context(data: T, context: HashMap<String, serde_json::Value>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
            context: Some(context),
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            error_kind: None,
            context: None,
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self {
                error_kind: Some(e.kind().to_string()),
                ..Self::fail(e.to_string())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_from_result_carries_kind() {
        let err: Result<i32> = Err(Error::invalid_argument("amount must be positive"));
        let result: OperationResult<i32> = err.into();
        assert!(!result.success);
        assert_eq!(result.error_kind.as_deref(), Some("invalid_argument"));
        assert!(result.error.unwrap().contains("Invalid argument"));
    }

    #[test]
    fn test_insufficient_funds_message() {
        let err = Error::InsufficientFunds {
            account_number: "1234567890".to_string(),
            available: Decimal::new(75_000_000, 2),
            requested: Decimal::new(100_000_000, 2),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds in account 1234567890: available 750000.00, requested 1000000.00"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_only_database_errors_are_retryable() {
        assert!(Error::database("connection reset").is_retryable());
        assert!(!Error::not_found("account 1").is_retryable());
        assert!(!Error::conflict("username taken").is_retryable());
    }
}
