//! # Session Repository
//!
//! Stores the single live [`DaySession`]: one `day_session` row plus its
//! itemized debts in `session_new_debts`.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use daybook_core::{DaySession, DayStatus, Money, NewDebts};

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: String,
    cash_minor: i64,
    bank_minor: i64,
    declared_new_debt_minor: i64,
    total_repaid_minor: i64,
    status: DayStatus,
    opened_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
}

/// Repository for the live day session.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Loads the stored session, if any.
    pub async fn load(&self) -> DbResult<Option<DaySession>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, cash_minor, bank_minor, declared_new_debt_minor,
                   total_repaid_minor, status, opened_at, closed_at
            FROM day_session
            WHERE slot = 1
            "#,
        )
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            debug!("No stored session");
            return Ok(None);
        };

        let debts: Vec<(String, i64)> = sqlx::query_as(
            "SELECT customer_name, amount_minor FROM session_new_debts ORDER BY customer_name",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let id = Uuid::parse_str(&row.id).map_err(|e| DbError::corrupt("day_session.id", e))?;
        let new_debts: NewDebts = debts
            .into_iter()
            .map(|(name, minor)| (name, Money::from_minor(minor)))
            .collect::<BTreeMap<_, _>>()
            .into();

        debug!(session_id = %id, items = new_debts.len(), "Loaded session");

        Ok(Some(DaySession {
            id,
            cash: Money::from_minor(row.cash_minor),
            bank: Money::from_minor(row.bank_minor),
            declared_new_debt: Money::from_minor(row.declared_new_debt_minor),
            new_debts,
            total_repaid: Money::from_minor(row.total_repaid_minor),
            status: row.status,
            opened_at: row.opened_at,
            closed_at: row.closed_at,
        }))
    }

    /// Replaces the stored session with `session` in one transaction.
    pub async fn save(&self, session: &DaySession) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        write_session(&mut *tx, session).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Removes the stored session and its itemized debts.
    pub async fn clear(&self) -> DbResult<()> {
        debug!("Clearing stored session");

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM session_new_debts")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM day_session")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Upserts the single `day_session` row and replaces its itemized debts on
/// `conn`. Callers own the transaction.
pub(crate) async fn write_session(
    conn: &mut SqliteConnection,
    session: &DaySession,
) -> DbResult<()> {
    debug!(
        session_id = %session.id,
        status = %session.status,
        items = session.new_debts.len(),
        "Saving session"
    );

    sqlx::query(
        r#"
        INSERT INTO day_session (
            slot, id, cash_minor, bank_minor, declared_new_debt_minor,
            total_repaid_minor, status, opened_at, closed_at, updated_at
        ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT (slot) DO UPDATE SET
            id = excluded.id,
            cash_minor = excluded.cash_minor,
            bank_minor = excluded.bank_minor,
            declared_new_debt_minor = excluded.declared_new_debt_minor,
            total_repaid_minor = excluded.total_repaid_minor,
            status = excluded.status,
            opened_at = excluded.opened_at,
            closed_at = excluded.closed_at,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(session.id.to_string())
    .bind(session.cash.minor())
    .bind(session.bank.minor())
    .bind(session.declared_new_debt.minor())
    .bind(session.total_repaid.minor())
    .bind(session.status)
    .bind(session.opened_at)
    .bind(session.closed_at)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM session_new_debts")
        .execute(&mut *conn)
        .await?;

    for (name, amount) in session.new_debts.iter() {
        sqlx::query("INSERT INTO session_new_debts (customer_name, amount_minor) VALUES (?1, ?2)")
            .bind(name)
            .bind(amount.minor())
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}
