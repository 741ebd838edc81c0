//! # Domain Types
//!
//! Small value types shared by the ledger, the session and the outer crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Rate
// =============================================================================

/// A percentage in basis points (bps).
///
/// 1 basis point = 0.01%, so 500 bps = 5%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// The rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percentage())
    }
}

// =============================================================================
// Day Status
// =============================================================================

/// Lifecycle of one day session.
///
/// ```text
///   ┌──────┐  close_day (matched)  ┌────────┐
///   │ Open │ ────────────────────► │ Closed │
///   └──────┘                       └────┬───┘
///       ▲        start_new_day          │
///       └───────────────────────────────┘
///                (fresh session)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Accepting sales input, debts and repayments.
    #[default]
    Open,
    /// Report emitted; waiting for a new day.
    Closed,
}

impl DayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Open => "open",
            DayStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sales Field
// =============================================================================

/// The three operator-entered figures of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SalesField {
    Cash,
    Bank,
    /// Total sold on credit today, as the operator declares it.
    DeclaredNewDebt,
}

impl SalesField {
    pub fn label(&self) -> &'static str {
        match self {
            SalesField::Cash => "cash",
            SalesField::Bank => "bank",
            SalesField::DeclaredNewDebt => "declared new debt",
        }
    }
}

impl FromStr for SalesField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(SalesField::Cash),
            "bank" => Ok(SalesField::Bank),
            "declared" | "declared_new_debt" | "credit" => Ok(SalesField::DeclaredNewDebt),
            other => Err(ValidationError::InvalidFormat {
                field: "sales field".to_string(),
                reason: format!("unknown field '{other}'"),
            }),
        }
    }
}

// =============================================================================
// Name Rule
// =============================================================================

/// How strictly customer names are checked before a debt is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NameRule {
    /// First and last name: at least two words.
    #[default]
    FullName,
    /// Any non-empty name.
    NonEmpty,
}
