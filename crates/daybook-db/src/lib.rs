//! # daybook-db: Persistence Gateway for Daybook
//!
//! Durable storage for the day book, behind the [`PersistenceGateway`] trait.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Daybook Data Flow                                │
//! │                                                                         │
//! │  DayBookService (apps/daybook)                                         │
//! │       │  mutate in memory first, then persist                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   daybook-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │          PersistenceGateway (trait, gateway.rs)                 │   │
//! │  │             │                              │                    │   │
//! │  │             ▼                              ▼                    │   │
//! │  │   ┌───────────────────┐          ┌───────────────────┐         │   │
//! │  │   │     Database      │          │   MemoryGateway   │         │   │
//! │  │   │    (pool.rs)      │          │   (memory.rs)     │         │   │
//! │  │   │  SessionRepo      │          │  tests, --ephemeral│        │   │
//! │  │   │  DebtorRepo       │          └───────────────────┘         │   │
//! │  │   │  ReportRepo       │                                        │   │
//! │  │   └─────────┬─────────┘                                        │   │
//! │  └─────────────┼───────────────────────────────────────────────────┘   │
//! │                ▼                                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │   day_session · session_new_debts · active_debtors · reports   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Session, debtor and report repositories
//! - [`gateway`] - The `PersistenceGateway` trait and its SQLite impl
//! - [`memory`] - Process-local gateway
//!
//! ## Usage
//!
//! ```rust,ignore
//! use daybook_db::{Database, DbConfig, PersistenceGateway};
//!
//! let db = Database::new(DbConfig::new("daybook.db")).await?;
//! let debtors = db.load_active_debtors().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod gateway;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use gateway::PersistenceGateway;
pub use memory::MemoryGateway;
pub use pool::{Database, DbConfig};

pub use repository::debtor::DebtorRepository;
pub use repository::report::ReportRepository;
pub use repository::session::SessionRepository;
