//! # Error Types
//!
//! Domain errors for daybook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  daybook-core errors (this file)                                       │
//! │  ├── CoreError        - Rejected ledger operations                     │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  daybook-db errors (separate crate)                                    │
//! │  └── DbError          - Persistence failures                           │
//! │                                                                         │
//! │  Operator shell errors (in app)                                        │
//! │  └── AppError         - What the operator sees (code + message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → Operator               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` is returned before any state is touched. A rejected
//! operation leaves the day book exactly as it was.

use thiserror::Error;

use crate::ledger::Reconciliation;
use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Rejected day book operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Bad name or amount. The operator can fix the input and retry.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Remove target has no itemized debt today.
    #[error("No new debt recorded for {name}")]
    NotFound { name: String },

    /// Repay target owes nothing in either pool.
    #[error("{name} has no outstanding debt")]
    NoDebtOwed { name: String },

    /// Day close was refused because the itemized debts do not match the
    /// declared total.
    ///
    /// ## User Workflow
    /// ```text
    /// declared: 8,000   detailed: 7,500
    ///      │
    ///      ▼
    /// close ──► NotReconciled { UnderDetailed { shortfall: 500 } }
    ///      │
    ///      ▼
    /// Operator itemizes the missing 500, then closes again
    /// ```
    #[error("Day cannot be closed: {reconciliation}")]
    NotReconciled { reconciliation: Reconciliation },

    /// The session is closed; only starting a new day is allowed.
    #[error("Day is already closed, start a new day first")]
    DayClosed,

    /// A new day was requested while the current one is still open.
    #[error("Current day is still open, close it before starting a new day")]
    DayStillOpen,
}

impl CoreError {
    /// Signed difference `detailed - declared` carried by a close refusal.
    pub fn reconciliation_delta(&self) -> Option<Money> {
        match self {
            CoreError::NotReconciled { reconciliation } => Some(reconciliation.delta()),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value is above the largest accepted amount.
    #[error("{field} cannot exceed {max}")]
    TooLarge { field: String, max: Money },

    /// Name does not have enough words.
    #[error("{field} must have at least {min} words (first and last name)")]
    TooFewWords { field: String, min: usize },

    /// Invalid format (e.g., unknown field name).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
