//! # Debtor Repository
//!
//! Stores the carried-over debtor pool in `active_debtors`.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use daybook_core::{ActiveDebtors, Money};

/// Repository for carried-over debt.
#[derive(Debug, Clone)]
pub struct DebtorRepository {
    pool: SqlitePool,
}

impl DebtorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DebtorRepository { pool }
    }

    /// Loads the whole pool.
    pub async fn load_all(&self) -> DbResult<ActiveDebtors> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT customer_name, amount_minor FROM active_debtors ORDER BY customer_name",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded active debtors");

        Ok(rows
            .into_iter()
            .map(|(name, minor)| (name, Money::from_minor(minor)))
            .collect())
    }

    /// Replaces the stored pool with `debtors` in one transaction.
    pub async fn save_all(&self, debtors: &ActiveDebtors) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        write_debtors(&mut *tx, debtors).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Replaces every `active_debtors` row on `conn`.
///
/// Callers own the transaction.
pub(crate) async fn write_debtors(
    conn: &mut SqliteConnection,
    debtors: &ActiveDebtors,
) -> DbResult<()> {
    debug!(count = debtors.len(), total = %debtors.total(), "Saving active debtors");

    let now = Utc::now();
    sqlx::query("DELETE FROM active_debtors")
        .execute(&mut *conn)
        .await?;

    for (name, amount) in debtors.iter() {
        sqlx::query(
            r#"
            INSERT INTO active_debtors (customer_name, amount_minor, updated_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(name)
        .bind(amount.minor())
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
