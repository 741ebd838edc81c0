//! # Day Book Service
//!
//! Runs every operator event against the in-memory [`DayBook`] and then
//! mirrors the result into a [`PersistenceGateway`].
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Mutate, then persist                                 │
//! │                                                                         │
//! │  event ──► DayBook (pure) ──► rejected? ──► AppError, nothing changed  │
//! │                 │                                                       │
//! │                 ▼ accepted                                              │
//! │            mark dirty parts                                             │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │            flush():  close commit → debtors → clear → session           │
//! │                 │                                                       │
//! │                 ▼ store refused                                         │
//! │            PERSISTENCE_FAILURE, in-memory state kept, still dirty       │
//! │            operator runs `save` to retry                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service never retries on its own. Each dirty part is cleared only
//! after the store has accepted it, so a later `save` writes exactly what is
//! still missing. A closed day is stored as one unit through
//! [`PersistenceGateway::commit_close`], never piece by piece.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use daybook_core::{
    CommissionPolicy, CustomerDebt, DailyReport, DayBook, DaySession, DaySummary, Money,
    NameRule, Repayment, SalesField,
};
use daybook_db::PersistenceGateway;

use crate::error::AppResult;

/// Parts of the day book the store has not accepted yet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Dirty {
    session: bool,
    debtors: bool,
    clear_stored_session: bool,
}

impl Dirty {
    fn any(&self) -> bool {
        self.session || self.debtors || self.clear_stored_session
    }
}

/// Owns the day book and the store behind it.
pub struct DayBookService<G: PersistenceGateway> {
    book: DayBook,
    gateway: G,
    dirty: Dirty,
    /// Closed day the store has not accepted yet. Its debtors and session
    /// are committed together with the report.
    pending_report: Option<DailyReport>,
}

impl<G: PersistenceGateway> DayBookService<G> {
    /// Restores the stored session and debtors, or opens a fresh day.
    ///
    /// A fresh day is saved right away so a restart finds it.
    pub async fn start(
        gateway: G,
        policy: CommissionPolicy,
        name_rule: NameRule,
    ) -> AppResult<Self> {
        let stored = gateway.load_session().await?;
        let debtors = gateway.load_active_debtors().await?;

        let (session, fresh) = match stored {
            Some(session) => {
                info!(
                    session_id = %session.id,
                    status = %session.status,
                    debtors = debtors.len(),
                    "Restored day session"
                );
                (session, false)
            }
            None => {
                let session = DaySession::open(Uuid::new_v4(), Utc::now());
                info!(session_id = %session.id, "No stored session, opening a new day");
                (session, true)
            }
        };

        let book = DayBook::new(session, debtors, policy).with_name_rule(name_rule);
        let mut service = DayBookService {
            book,
            gateway,
            dirty: Dirty::default(),
            pending_report: None,
        };

        if fresh {
            service.dirty.session = true;
            service.flush().await?;
        }

        Ok(service)
    }

    // -------------------------------------------------------------------------
    // Read side
    // -------------------------------------------------------------------------

    pub fn book(&self) -> &DayBook {
        &self.book
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn summary(&self) -> DaySummary {
        self.book.summary()
    }

    pub fn customer_debt(&self, name: &str) -> CustomerDebt {
        self.book.customer_debt(name)
    }

    /// True when some change has not reached the store.
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty.any() || self.pending_report.is_some()
    }

    pub fn pending_report(&self) -> Option<&DailyReport> {
        self.pending_report.as_ref()
    }

    /// Stored reports, newest first.
    pub async fn history(&self, limit: u32) -> AppResult<Vec<DailyReport>> {
        Ok(self.gateway.list_reports(limit).await?)
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Parses `raw` as an amount and stores it in `field`.
    pub async fn enter_sales_field(&mut self, field: SalesField, raw: &str) -> AppResult<Money> {
        let amount = self.book.enter_sales_field(field, raw)?;
        debug!(field = field.label(), %amount, "Sales field entered");
        self.dirty.session = true;
        self.flush().await?;
        Ok(amount)
    }

    /// Adds a credit sale. Returns the customer's new-debt entry.
    pub async fn add_debt(&mut self, name: &str, amount: Money) -> AppResult<Money> {
        let entry = self.book.add_debt(name, amount)?;
        debug!(%amount, %entry, "Debt added");
        self.dirty.session = true;
        self.flush().await?;
        Ok(entry)
    }

    /// Removes a customer's itemized debt if `confirm` approves.
    pub async fn remove_debt<F>(&mut self, name: &str, confirm: F) -> AppResult<Option<Money>>
    where
        F: FnOnce(&str, Money) -> bool,
    {
        let removed = self.book.remove_debt(name, confirm)?;
        match removed {
            Some(amount) => {
                debug!(%amount, "Debt removed");
                self.dirty.session = true;
                self.flush().await?;
            }
            None => debug!("Debt removal declined"),
        }
        Ok(removed)
    }

    /// Books a repayment; an over-payment is clamped to what is owed.
    pub async fn repay(&mut self, name: &str, amount: Money) -> AppResult<Repayment> {
        let repayment = self.book.repay(name, amount)?;

        if repayment.was_clamped() {
            warn!(
                customer = %repayment.name,
                requested = %repayment.requested,
                applied = %repayment.applied,
                "Repayment exceeded outstanding debt and was clamped"
            );
        } else {
            debug!(customer = %repayment.name, applied = %repayment.applied, "Repayment booked");
        }

        self.dirty.session = true;
        if repayment.from_active_debtors.is_positive() {
            self.dirty.debtors = true;
        }
        self.flush().await?;
        Ok(repayment)
    }

    /// Closes the day and stores its report.
    ///
    /// On a store failure the day is still closed in memory and the report
    /// is kept as pending until a later [`Self::flush`] succeeds.
    pub async fn close_day(&mut self) -> AppResult<DailyReport> {
        let report = self.book.close_day(Uuid::new_v4(), Utc::now())?;
        info!(
            report_id = %report.id,
            session_id = %report.session_id,
            total_sales = %report.total_sales,
            commission = %report.commission,
            net_due = %report.net_due,
            "Day closed"
        );

        self.pending_report = Some(report.clone());
        self.flush().await?;
        Ok(report)
    }

    /// Starts a new day after a close.
    ///
    /// Refused while the previous day's report is unsaved and the store
    /// still will not take it.
    pub async fn start_new_day(&mut self) -> AppResult<()> {
        if self.pending_report.is_some() {
            self.flush().await?;
        }

        self.book.start_new_day(Uuid::new_v4(), Utc::now())?;
        info!(session_id = %self.book.session().id, "New day started");

        self.dirty.clear_stored_session = true;
        self.dirty.session = true;
        self.flush().await
    }

    /// Writes every unsaved part to the store.
    ///
    /// Order: pending close commit, active debtors, stored-session clear,
    /// session. Stops at the first failure; parts already accepted stay
    /// accepted.
    pub async fn flush(&mut self) -> AppResult<()> {
        if let Some(report) = &self.pending_report {
            self.gateway
                .commit_close(report, self.book.active_debtors(), self.book.session())
                .await?;
            self.pending_report = None;
            self.dirty.debtors = false;
            self.dirty.session = false;
        }

        if self.dirty.debtors {
            self.gateway
                .save_active_debtors(self.book.active_debtors())
                .await?;
            self.dirty.debtors = false;
        }

        if self.dirty.clear_stored_session {
            self.gateway.clear_session().await?;
            self.dirty.clear_stored_session = false;
        }

        if self.dirty.session {
            self.gateway.save_session(self.book.session()).await?;
            self.dirty.session = false;
        }

        Ok(())
    }
}
