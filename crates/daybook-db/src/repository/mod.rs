//! # Repository Module
//!
//! One repository per stored concern, each a thin wrapper around a pool
//! clone.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SessionRepository   day_session + session_new_debts                   │
//! │  ├── load()          → Option<DaySession>                              │
//! │  ├── save(&session)  one transaction, rows replaced                    │
//! │  └── clear()                                                           │
//! │                                                                         │
//! │  DebtorRepository    active_debtors                                    │
//! │  ├── load_all()      → ActiveDebtors                                   │
//! │  └── save_all(&pool) one transaction, rows replaced                    │
//! │                                                                         │
//! │  ReportRepository    daily_reports (append-only)                       │
//! │  ├── append(&report) INSERT only, duplicate id → UniqueViolation       │
//! │  └── list_recent(n)                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each module also exposes a crate-private writer that takes a bare
//! connection (`write_session`, `write_debtors`, `insert_report`). The
//! day-close commit runs all three inside one transaction.

pub mod debtor;
pub mod report;
pub mod session;
