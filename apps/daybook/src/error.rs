//! # Application Error Type
//!
//! Unified error type for everything the operator shell can report.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Daybook                                │
//! │                                                                         │
//! │  Operator types:  repay 500 Ali Hassan                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  DayBookService::repay  →  AppResult<Repayment>                  │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Rule broken? ─── CoreError::NoDebtOwed ─────────┐              │  │
//! │  │         │                                         │              │  │
//! │  │         ▼                                         ▼              │  │
//! │  │  Save failed? ─── DbError::QueryFailed ─────── AppError ───────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Shell prints:  error [NO_DEBT_OWED]: Ali Hassan has no outstanding debt│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Errors serialize with a machine-readable `code` and a human-readable
//! `message` so a front end other than the shell can consume them.

use daybook_core::{CoreError, Money};
use daybook_db::DbError;
use serde::Serialize;

use crate::config::ConfigError;

/// Error returned from service operations and shell commands.
///
/// ```json
/// {
///   "code": "NOT_RECONCILED",
///   "message": "Day cannot be closed: itemized debts are short by 500",
///   "delta": -50000
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Signed `detailed - declared` difference, set on close refusals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<Money>,
}

/// Error codes for shell and API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad name, amount or command argument
    InvalidInput,

    /// Remove target has no itemized debt today
    NotFound,

    /// Repay target owes nothing
    NoDebtOwed,

    /// Close refused, itemized debts do not match the declared total
    NotReconciled,

    /// The day is closed; only `new-day` is accepted
    DayClosed,

    /// `new-day` requested while the day is still open
    DayStillOpen,

    /// In-memory state changed but the store did not accept it
    PersistenceFailure,

    /// Configuration could not be loaded or is invalid
    Config,

    /// Anything else
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::NoDebtOwed => "NO_DEBT_OWED",
            ErrorCode::NotReconciled => "NOT_RECONCILED",
            ErrorCode::DayClosed => "DAY_CLOSED",
            ErrorCode::DayStillOpen => "DAY_STILL_OPEN",
            ErrorCode::PersistenceFailure => "PERSISTENCE_FAILURE",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AppError {
    /// Creates a new application error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
            delta: None,
        }
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::InvalidInput, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }

    /// Wraps a store failure that happened after the in-memory change.
    pub fn persistence(err: &DbError) -> Self {
        AppError::new(
            ErrorCode::PersistenceFailure,
            format!("Store error: {err}. Unsaved changes stay in memory; use `save` to retry"),
        )
    }

    pub fn is_persistence_failure(&self) -> bool {
        self.code == ErrorCode::PersistenceFailure
    }
}

/// Converts store errors to application errors.
///
/// Every store error surfaces as `PERSISTENCE_FAILURE`; the detail is logged.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        tracing::warn!(error = %err, "Persistence failed");
        AppError::persistence(&err)
    }
}

/// Converts ledger errors to application errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let delta = err.reconciliation_delta();
        let code = match &err {
            CoreError::InvalidInput(_) => ErrorCode::InvalidInput,
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::NoDebtOwed { .. } => ErrorCode::NoDebtOwed,
            CoreError::NotReconciled { .. } => ErrorCode::NotReconciled,
            CoreError::DayClosed => ErrorCode::DayClosed,
            CoreError::DayStillOpen => ErrorCode::DayStillOpen,
        };
        AppError {
            code,
            message: err.to_string(),
            delta,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::Config, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Result type for service operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::{Reconciliation, ValidationError};

    #[test]
    fn test_core_error_codes() {
        let err: AppError = CoreError::NoDebtOwed {
            name: "Ali Hassan".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::NoDebtOwed);
        assert_eq!(err.message, "Ali Hassan has no outstanding debt");

        let err: AppError = CoreError::from(ValidationError::MustBePositive {
            field: "debt amount".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        let err: AppError = CoreError::DayClosed.into();
        assert_eq!(err.code, ErrorCode::DayClosed);
    }

    #[test]
    fn test_not_reconciled_carries_delta() {
        let reconciliation =
            Reconciliation::check(Money::from_units(8000), Money::from_units(7500));
        let err: AppError = CoreError::NotReconciled { reconciliation }.into();

        assert_eq!(err.code, ErrorCode::NotReconciled);
        assert_eq!(err.delta, Some(Money::from_units(-500)));
    }

    #[test]
    fn test_db_error_is_persistence_failure() {
        let err: AppError = DbError::QueryFailed("disk I/O error".into()).into();
        assert!(err.is_persistence_failure());
        assert!(err.message.contains("disk I/O error"));
    }

    #[test]
    fn test_serialization() {
        let err = AppError::invalid_input("unknown command 'frobnicate'");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "INVALID_INPUT");
        assert_eq!(json["message"], "unknown command 'frobnicate'");
        assert!(json.get("delta").is_none());
        assert_eq!(err.to_string(), "[INVALID_INPUT] unknown command 'frobnicate'");
    }
}
