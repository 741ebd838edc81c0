//! # daybook-core: Pure Ledger Logic for a Shop Day Book
//!
//! This crate holds every rule of the day book as pure functions and plain
//! data. It never touches the clock, the disk or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Daybook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Operator shell (apps/daybook)                │   │
//! │  │    cash / bank / add / repay / close / new-day ...              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ daybook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │ commission │  │  ledger   │  │  session  │  │   │
//! │  │   │ parse/fmt │  │  policies  │  │ two pools │  │  DayBook  │  │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO DATABASE • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  daybook-db (Persistence Gateway)               │   │
//! │  │            SQLite store, migrations, in-memory gateway          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer money, free-text parsing, thousands grouping
//! - [`commission`] - Tiered-floor and flat-rate commission strategies
//! - [`ledger`] - New-debt and active-debtor pools, reconciliation, repayment
//! - [`session`] - The day session and the [`DayBook`] aggregate
//! - [`types`] - Small shared value types
//! - [`validation`] - Customer name and amount rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use daybook_core::{ActiveDebtors, CommissionPolicy, DayBook, DaySession, Money};
//! use uuid::Uuid;
//!
//! let session = DaySession::open(Uuid::new_v4(), Utc::now());
//! let mut book = DayBook::new(session, ActiveDebtors::default(), CommissionPolicy::default());
//!
//! book.set_cash(Money::from_units(5000)).unwrap();
//! book.set_bank(Money::from_units(3000)).unwrap();
//! book.set_declared_new_debt(Money::from_units(8000)).unwrap();
//! book.add_debt("Ali Hassan", Money::from_units(8000)).unwrap();
//!
//! assert!(book.reconciliation().is_matched());
//! assert_eq!(book.commission(), Money::from_units(15000));
//! assert_eq!(book.net_due(), Money::from_units(1000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commission;
pub mod error;
pub mod ledger;
pub mod money;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use commission::CommissionPolicy;
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{ActiveDebtors, DebtorLine, NewDebts, Reconciliation, Repayment};
pub use money::{parse_amount, Money};
pub use session::{CustomerDebt, DailyReport, DayBook, DaySession, DaySummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Sales block that earns one commission unit under the tiered policy.
pub const UNIT_SALES: i64 = 8000;

/// Commission paid per full [`UNIT_SALES`] block.
pub const COMMISSION_PER_UNIT: i64 = 600;

/// Commission floor for a day under the tiered policy.
///
/// A slow day still pays at least this much, so the tiered formula is
/// clamped up to it.
pub const MIN_DAILY: i64 = 15000;

/// Flat-rate policy default: 5% in basis points.
pub const FLAT_RATE_BPS: u32 = 500;

/// Largest amount, in whole units, accepted for any single figure or total.
///
/// ## Business Reason
/// Keeps every sum of valid inputs far inside `i64`, so a mistyped
/// 20-digit amount is rejected instead of wrapping the day's totals.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;
