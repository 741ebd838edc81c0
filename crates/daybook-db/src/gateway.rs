//! # Persistence Gateway
//!
//! The seam between the day book and whatever keeps it durable.
//!
//! The ledger logic never sees this trait. The service in the operator shell
//! mutates the in-memory [`daybook_core::DayBook`] first and only then calls
//! the gateway, so a slow or failed save can leave the stored copy behind
//! the in-memory one but never inconsistent with it.
//!
//! A day close touches three things at once (report, debtors, session), so
//! it goes through [`PersistenceGateway::commit_close`]: either all three
//! are stored or none is.

use async_trait::async_trait;
use tracing::debug;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::{debtor as debtor_repo, report as report_repo, session as session_repo};
use daybook_core::{ActiveDebtors, DailyReport, DaySession};

/// Durable store for the session, the debtor pool and closed-day reports.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn load_session(&self) -> DbResult<Option<DaySession>>;
    async fn save_session(&self, session: &DaySession) -> DbResult<()>;
    async fn clear_session(&self) -> DbResult<()>;

    async fn load_active_debtors(&self) -> DbResult<ActiveDebtors>;
    async fn save_active_debtors(&self, debtors: &ActiveDebtors) -> DbResult<()>;

    /// Stores a report. Must refuse to overwrite one already stored.
    async fn append_report(&self, report: &DailyReport) -> DbResult<()>;

    /// Stores a closed day as one unit: the report, the rolled-over debtors
    /// and the closed session.
    ///
    /// Idempotent on the report id. When a report with the same id is
    /// already stored the insert is skipped and the rest is written again.
    /// A different report for the same session fails with
    /// [`crate::DbError::UniqueViolation`] and nothing is written.
    async fn commit_close(
        &self,
        report: &DailyReport,
        debtors: &ActiveDebtors,
        session: &DaySession,
    ) -> DbResult<()>;

    /// Most recent reports, newest first.
    async fn list_reports(&self, limit: u32) -> DbResult<Vec<DailyReport>>;
}

#[async_trait]
impl PersistenceGateway for Database {
    async fn load_session(&self) -> DbResult<Option<DaySession>> {
        self.sessions().load().await
    }

    async fn save_session(&self, session: &DaySession) -> DbResult<()> {
        self.sessions().save(session).await
    }

    async fn clear_session(&self) -> DbResult<()> {
        self.sessions().clear().await
    }

    async fn load_active_debtors(&self) -> DbResult<ActiveDebtors> {
        self.debtors().load_all().await
    }

    async fn save_active_debtors(&self, debtors: &ActiveDebtors) -> DbResult<()> {
        self.debtors().save_all(debtors).await
    }

    async fn append_report(&self, report: &DailyReport) -> DbResult<()> {
        self.reports().append(report).await
    }

    async fn commit_close(
        &self,
        report: &DailyReport,
        debtors: &ActiveDebtors,
        session: &DaySession,
    ) -> DbResult<()> {
        debug!(report_id = %report.id, session_id = %session.id, "Committing day close");

        let mut tx = self.pool().begin().await?;
        if report_repo::report_stored(&mut *tx, report.id).await? {
            debug!(report_id = %report.id, "Report already stored");
        } else {
            report_repo::insert_report(&mut *tx, report).await?;
        }
        debtor_repo::write_debtors(&mut *tx, debtors).await?;
        session_repo::write_session(&mut *tx, session).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_reports(&self, limit: u32) -> DbResult<Vec<DailyReport>> {
        debug!(limit, "Listing reports");
        self.reports().list_recent(limit).await
    }
}
