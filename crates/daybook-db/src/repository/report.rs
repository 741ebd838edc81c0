//! # Report Repository
//!
//! Append-only store for [`DailyReport`]s.
//!
//! There is no update or delete here, and triggers on `daily_reports` refuse
//! both at the SQL level too. A second append with a stored id (or for a
//! session that already has a report) fails with
//! [`DbError::UniqueViolation`] and leaves the first row as it was.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use daybook_core::{CommissionPolicy, DailyReport, Money};

#[derive(Debug, sqlx::FromRow)]
struct ReportRow {
    id: String,
    session_id: String,
    closed_at: DateTime<Utc>,
    cash_minor: i64,
    bank_minor: i64,
    declared_new_debt_minor: i64,
    total_sales_minor: i64,
    total_repaid_minor: i64,
    commission_minor: i64,
    net_due_minor: i64,
    commission_policy: String,
    new_debts: String,
    active_debtors: String,
}

impl TryFrom<ReportRow> for DailyReport {
    type Error = DbError;

    fn try_from(row: ReportRow) -> DbResult<Self> {
        let commission_policy: CommissionPolicy = serde_json::from_str(&row.commission_policy)?;
        let new_debts: BTreeMap<String, Money> = serde_json::from_str(&row.new_debts)?;
        let active_debtors: BTreeMap<String, Money> = serde_json::from_str(&row.active_debtors)?;

        Ok(DailyReport {
            id: Uuid::parse_str(&row.id).map_err(|e| DbError::corrupt("daily_reports.id", e))?,
            session_id: Uuid::parse_str(&row.session_id)
                .map_err(|e| DbError::corrupt("daily_reports.session_id", e))?,
            closed_at: row.closed_at,
            cash: Money::from_minor(row.cash_minor),
            bank: Money::from_minor(row.bank_minor),
            declared_new_debt: Money::from_minor(row.declared_new_debt_minor),
            total_sales: Money::from_minor(row.total_sales_minor),
            total_repaid: Money::from_minor(row.total_repaid_minor),
            commission: Money::from_minor(row.commission_minor),
            commission_policy,
            net_due: Money::from_minor(row.net_due_minor),
            new_debts,
            active_debtors,
        })
    }
}

const SELECT_REPORT: &str = r#"
    SELECT id, session_id, closed_at, cash_minor, bank_minor,
           declared_new_debt_minor, total_sales_minor, total_repaid_minor,
           commission_minor, net_due_minor, commission_policy,
           new_debts, active_debtors
    FROM daily_reports
"#;

/// Inserts a report on `conn`. Never overwrites.
///
/// Shared by [`ReportRepository::append`] and the day-close transaction.
pub(crate) async fn insert_report(
    conn: &mut SqliteConnection,
    report: &DailyReport,
) -> DbResult<()> {
    debug!(
        report_id = %report.id,
        session_id = %report.session_id,
        net_due = %report.net_due,
        "Appending daily report"
    );

    sqlx::query(
        r#"
        INSERT INTO daily_reports (
            id, session_id, closed_at,
            cash_minor, bank_minor, declared_new_debt_minor,
            total_sales_minor, total_repaid_minor, commission_minor, net_due_minor,
            commission_policy, new_debts, active_debtors
        ) VALUES (
            ?1, ?2, ?3,
            ?4, ?5, ?6,
            ?7, ?8, ?9, ?10,
            ?11, ?12, ?13
        )
        "#,
    )
    .bind(report.id.to_string())
    .bind(report.session_id.to_string())
    .bind(report.closed_at)
    .bind(report.cash.minor())
    .bind(report.bank.minor())
    .bind(report.declared_new_debt.minor())
    .bind(report.total_sales.minor())
    .bind(report.total_repaid.minor())
    .bind(report.commission.minor())
    .bind(report.net_due.minor())
    .bind(serde_json::to_string(&report.commission_policy)?)
    .bind(serde_json::to_string(&report.new_debts)?)
    .bind(serde_json::to_string(&report.active_debtors)?)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, report.id.to_string()),
        other => other,
    })?;

    Ok(())
}

/// `true` when a report with this exact id is already stored.
pub(crate) async fn report_stored(conn: &mut SqliteConnection, id: Uuid) -> DbResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM daily_reports WHERE id = ?1")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

/// Repository for closed-day reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Inserts a report. Never overwrites.
    pub async fn append(&self, report: &DailyReport) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_report(&mut *conn, report).await
    }

    /// Newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<DailyReport>> {
        let rows: Vec<ReportRow> = sqlx::query_as(&format!(
            "{SELECT_REPORT} ORDER BY closed_at DESC, rowid DESC LIMIT ?1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed daily reports");

        rows.into_iter().map(DailyReport::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;

    fn report(closed_at: DateTime<Utc>) -> DailyReport {
        DailyReport {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            closed_at,
            cash: Money::from_units(5000),
            bank: Money::from_units(3000),
            declared_new_debt: Money::from_units(8000),
            total_sales: Money::from_units(16000),
            total_repaid: Money::zero(),
            commission: Money::from_units(15000),
            commission_policy: CommissionPolicy::tiered(),
            net_due: Money::from_units(1000),
            new_debts: BTreeMap::from([("Ali Hassan".to_string(), Money::from_units(8000))]),
            active_debtors: BTreeMap::from([("Ali Hassan".to_string(), Money::from_units(8000))]),
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn stored(db: &Database) -> Vec<DailyReport> {
        db.reports().list_recent(100).await.unwrap()
    }

    #[tokio::test]
    async fn test_append_and_load() {
        let db = db().await;
        let report = report(Utc::now());
        db.reports().append(&report).await.unwrap();

        let loaded = stored(&db).await.remove(0);
        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.net_due, report.net_due);
        assert_eq!(loaded.commission_policy, report.commission_policy);
        assert_eq!(loaded.new_debts, report.new_debts);
        assert_eq!(loaded.active_debtors, report.active_debtors);

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(report_stored(&mut *conn, report.id).await.unwrap());
        assert!(!report_stored(&mut *conn, Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_append_never_overwrites() {
        let db = db().await;
        let original = report(Utc::now());
        db.reports().append(&original).await.unwrap();

        let mut altered = original.clone();
        altered.net_due = Money::from_units(999_999);
        let err = db.reports().append(&altered).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let reports = stored(&db).await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].net_due, Money::from_units(1000));
    }

    #[tokio::test]
    async fn test_triggers_refuse_update_and_delete() {
        let db = db().await;
        db.reports().append(&report(Utc::now())).await.unwrap();

        let err: DbError = sqlx::query("UPDATE daily_reports SET net_due_minor = 0")
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));

        let err: DbError = sqlx::query("DELETE FROM daily_reports")
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));
        assert_eq!(stored(&db).await.len(), 1);
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let db = db().await;
        let now = Utc::now();
        let older = report(now - Duration::days(1));
        let newer = report(now);
        db.reports().append(&older).await.unwrap();
        db.reports().append(&newer).await.unwrap();

        let listed = db.reports().list_recent(10).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);

        assert_eq!(db.reports().list_recent(1).await.unwrap().len(), 1);
    }
}
