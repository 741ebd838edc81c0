//! Gateway contract tests, run against both implementations.

use chrono::Utc;
use daybook_core::{ActiveDebtors, CommissionPolicy, DayBook, DaySession, DayStatus, Money};
use daybook_db::{Database, DbConfig, DbError, MemoryGateway, PersistenceGateway};
use uuid::Uuid;

/// Closes a reconciled day and returns the book and its report.
fn closed_day() -> (DayBook, daybook_core::DailyReport) {
    let mut book = DayBook::new(
        DaySession::open(Uuid::new_v4(), Utc::now()),
        ActiveDebtors::default(),
        CommissionPolicy::tiered(),
    );
    book.set_cash(Money::from_units(5000)).unwrap();
    book.set_bank(Money::from_units(3000)).unwrap();
    book.set_declared_new_debt(Money::from_units(8000)).unwrap();
    book.add_debt("Ali Hassan", Money::from_units(8000)).unwrap();
    let report = book.close_day(Uuid::new_v4(), Utc::now()).unwrap();
    (book, report)
}

async fn exercise_contract<G: PersistenceGateway>(gateway: &G) {
    assert!(gateway.load_session().await.unwrap().is_none());
    assert!(gateway.load_active_debtors().await.unwrap().is_empty());

    let (book, report) = closed_day();

    gateway.append_report(&report).await.unwrap();
    gateway
        .save_active_debtors(book.active_debtors())
        .await
        .unwrap();
    gateway.save_session(book.session()).await.unwrap();

    let session = gateway.load_session().await.unwrap().unwrap();
    assert_eq!(session.id, book.session().id);
    assert_eq!(session.status, book.session().status);
    assert_eq!(session.new_debts, book.session().new_debts);

    let debtors = gateway.load_active_debtors().await.unwrap();
    assert_eq!(debtors.get("Ali Hassan"), Money::from_units(8000));

    // Append-only: the same report cannot be stored twice
    let err = gateway.append_report(&report).await.unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }));

    let reports = gateway.list_reports(5).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].net_due, Money::from_units(1000));

    // Committing the same close again is accepted and stores no second report
    gateway
        .commit_close(&report, book.active_debtors(), book.session())
        .await
        .unwrap();
    assert_eq!(gateway.list_reports(5).await.unwrap().len(), 1);

    gateway.clear_session().await.unwrap();
    assert!(gateway.load_session().await.unwrap().is_none());
    // Debtors survive clearing the session
    assert!(!gateway.load_active_debtors().await.unwrap().is_empty());
}

/// A close whose report conflicts with a stored one writes nothing at all.
async fn exercise_close_is_atomic<G: PersistenceGateway>(gateway: &G) {
    let (book, report) = closed_day();
    let mut open_session = book.session().clone();
    open_session.status = DayStatus::Open;
    open_session.closed_at = None;
    gateway.save_session(&open_session).await.unwrap();

    // Same session, different report id
    let mut stray = report.clone();
    stray.id = Uuid::new_v4();
    gateway.append_report(&stray).await.unwrap();

    let err = gateway
        .commit_close(&report, book.active_debtors(), book.session())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }));

    assert!(gateway.load_active_debtors().await.unwrap().is_empty());
    let session = gateway.load_session().await.unwrap().unwrap();
    assert_eq!(session.status, DayStatus::Open);
    let reports = gateway.list_reports(5).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, stray.id);
}

#[tokio::test]
async fn test_sqlite_gateway_contract() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    exercise_contract(&db).await;
}

#[tokio::test]
async fn test_memory_gateway_contract() {
    let gateway = MemoryGateway::new();
    exercise_contract(&gateway).await;
    assert_eq!(gateway.report_count().await, 1);
}

#[tokio::test]
async fn test_sqlite_close_is_atomic() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    exercise_close_is_atomic(&db).await;
}

#[tokio::test]
async fn test_memory_close_is_atomic() {
    exercise_close_is_atomic(&MemoryGateway::new()).await;
}

#[tokio::test]
async fn test_sqlite_gateway_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daybook.db");

    let (book, report) = closed_day();
    {
        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.commit_close(&report, book.active_debtors(), book.session())
            .await
            .unwrap();
        db.close().await;
    }

    let db = Database::new(DbConfig::new(&path)).await.unwrap();
    let session = db.load_session().await.unwrap().unwrap();
    assert_eq!(session.id, book.session().id);
    assert_eq!(db.list_reports(10).await.unwrap()[0].id, report.id);
    assert_eq!(
        db.load_active_debtors().await.unwrap(),
        book.active_debtors().clone()
    );
}
