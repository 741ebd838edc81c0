//! # Memory Gateway
//!
//! A [`PersistenceGateway`] that keeps everything in process memory.
//! Used by tests and by throwaway `--ephemeral` runs of the operator shell.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{DbError, DbResult};
use crate::gateway::PersistenceGateway;
use daybook_core::{ActiveDebtors, DailyReport, DaySession};

#[derive(Debug, Default)]
struct MemoryState {
    session: Option<DaySession>,
    debtors: ActiveDebtors,
    reports: Vec<DailyReport>,
}

impl MemoryState {
    /// Same uniqueness rules as the `daily_reports` table.
    fn check_report_unique(&self, report: &DailyReport) -> DbResult<()> {
        if self.reports.iter().any(|r| r.id == report.id) {
            return Err(DbError::duplicate("daily_reports.id", report.id.to_string()));
        }
        if self.reports.iter().any(|r| r.session_id == report.session_id) {
            return Err(DbError::duplicate(
                "daily_reports.session_id",
                report.session_id.to_string(),
            ));
        }
        Ok(())
    }
}

/// In-memory store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, as if a previous run had saved these.
    pub fn with_state(session: Option<DaySession>, debtors: ActiveDebtors) -> Self {
        MemoryGateway {
            state: Arc::new(Mutex::new(MemoryState {
                session,
                debtors,
                reports: Vec::new(),
            })),
        }
    }

    pub async fn report_count(&self) -> usize {
        self.state.lock().await.reports.len()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn load_session(&self) -> DbResult<Option<DaySession>> {
        Ok(self.state.lock().await.session.clone())
    }

    async fn save_session(&self, session: &DaySession) -> DbResult<()> {
        self.state.lock().await.session = Some(session.clone());
        Ok(())
    }

    async fn clear_session(&self) -> DbResult<()> {
        self.state.lock().await.session = None;
        Ok(())
    }

    async fn load_active_debtors(&self) -> DbResult<ActiveDebtors> {
        Ok(self.state.lock().await.debtors.clone())
    }

    async fn save_active_debtors(&self, debtors: &ActiveDebtors) -> DbResult<()> {
        self.state.lock().await.debtors = debtors.clone();
        Ok(())
    }

    async fn append_report(&self, report: &DailyReport) -> DbResult<()> {
        let mut state = self.state.lock().await;
        state.check_report_unique(report)?;
        state.reports.push(report.clone());
        Ok(())
    }

    async fn commit_close(
        &self,
        report: &DailyReport,
        debtors: &ActiveDebtors,
        session: &DaySession,
    ) -> DbResult<()> {
        // One lock for all three writes; every check runs before any write
        let mut state = self.state.lock().await;
        if !state.reports.iter().any(|r| r.id == report.id) {
            state.check_report_unique(report)?;
            state.reports.push(report.clone());
        }
        state.debtors = debtors.clone();
        state.session = Some(session.clone());
        Ok(())
    }

    async fn list_reports(&self, limit: u32) -> DbResult<Vec<DailyReport>> {
        let state = self.state.lock().await;
        // Latest append wins a closed_at tie, as rowid does in SQLite
        let mut reports: Vec<DailyReport> = state.reports.iter().rev().cloned().collect();
        reports.sort_by(|a, b| b.closed_at.cmp(&a.closed_at));
        reports.truncate(limit as usize);
        Ok(reports)
    }
}
