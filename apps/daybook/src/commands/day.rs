//! # Day Commands
//!
//! Sales figures, the day status, closing, the next day and stored history.

use daybook_core::{DailyReport, DaySummary, DayStatus, Money, SalesField};
use daybook_db::PersistenceGateway;

use crate::error::AppResult;
use crate::service::DayBookService;

/// Sets one of the three operator-entered figures.
///
/// ## Example
/// ```text
/// > cash 5,000
/// cash set to 5,000 (total sales 5,000)
/// ```
pub async fn set_sales_field<G: PersistenceGateway>(
    service: &mut DayBookService<G>,
    field: SalesField,
    raw: &str,
) -> AppResult<String> {
    let amount = service.enter_sales_field(field, raw).await?;
    Ok(format!(
        "{} set to {} (total sales {})",
        field.label(),
        amount,
        service.book().total_sales()
    ))
}

pub fn status<G: PersistenceGateway>(service: &DayBookService<G>, store_name: &str) -> String {
    render_summary(store_name, &service.summary())
}

/// Closes the day and prints its report.
pub async fn close_day<G: PersistenceGateway>(service: &mut DayBookService<G>) -> AppResult<String> {
    let report = service.close_day().await?;
    Ok(format!("Day closed.\n{}", render_report(&report)))
}

pub async fn start_new_day<G: PersistenceGateway>(
    service: &mut DayBookService<G>,
) -> AppResult<String> {
    service.start_new_day().await?;
    Ok(format!(
        "New day started. {} debtor(s) carried over, {} outstanding.",
        service.book().active_debtors().len(),
        service.book().active_debtors().total()
    ))
}

pub async fn history<G: PersistenceGateway>(
    service: &DayBookService<G>,
    limit: u32,
) -> AppResult<String> {
    let reports = service.history(limit).await?;
    if reports.is_empty() {
        return Ok("No closed days yet.".to_string());
    }

    let lines: Vec<String> = reports
        .iter()
        .map(|report| {
            format!(
                "{}  sales {:>12}  commission {:>10}  net due {:>12}",
                report.closed_at.format("%Y-%m-%d %H:%M"),
                report.total_sales,
                report.commission,
                report.net_due
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Retries every unsaved write.
pub async fn save<G: PersistenceGateway>(service: &mut DayBookService<G>) -> AppResult<String> {
    if !service.has_unsaved_changes() {
        return Ok("Nothing to save.".to_string());
    }
    service.flush().await?;
    Ok("Saved.".to_string())
}

// =============================================================================
// Rendering
// =============================================================================

/// One labelled, right-aligned amount.
fn figure(label: &str, amount: Money) -> String {
    format!("  {label:<18}{amount:>14}")
}

pub fn render_summary(store_name: &str, summary: &DaySummary) -> String {
    let state = match summary.status {
        DayStatus::Open => "open",
        DayStatus::Closed => "closed, type `new-day` to continue",
    };

    [
        format!("{store_name}: day {state}"),
        figure("Cash", summary.cash),
        figure("Bank", summary.bank),
        figure("Declared credit", summary.declared_new_debt),
        figure("Itemized credit", summary.detailed_new_debt),
        figure("Total sales", summary.total_sales),
        figure("Repaid", summary.total_repaid),
        figure("Commission", summary.commission),
        figure("Net due", summary.net_due),
        format!("  Debts: {}", summary.reconciliation),
        format!(
            "  Ready to close: {}",
            if summary.can_close { "yes" } else { "no" }
        ),
    ]
    .join("\n")
}

pub fn render_report(report: &DailyReport) -> String {
    let mut lines = vec![
        format!(
            "Report {} closed {}",
            report.id,
            report.closed_at.format("%Y-%m-%d %H:%M")
        ),
        figure("Total sales", report.total_sales),
        figure("Repaid", report.total_repaid),
        format!(
            "{}  ({})",
            figure("Commission", report.commission),
            report.commission_policy
        ),
        figure("Net due", report.net_due),
    ];

    if !report.new_debts.is_empty() {
        lines.push("  New debts:".to_string());
        lines.extend(
            report
                .new_debts
                .iter()
                .map(|(name, amount)| format!("    {name:<24}{amount:>12}")),
        );
    }
    lines.push(format!(
        "  Debtors carried forward: {}",
        report.active_debtors.len()
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_core::{CommissionPolicy, Money, NameRule};
    use daybook_db::MemoryGateway;

    async fn service() -> DayBookService<MemoryGateway> {
        DayBookService::start(
            MemoryGateway::new(),
            CommissionPolicy::default(),
            NameRule::FullName,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_set_sales_field_output() {
        let mut service = service().await;
        set_sales_field(&mut service, SalesField::Cash, "5000").await.unwrap();
        let out = set_sales_field(&mut service, SalesField::Bank, "3,000.5")
            .await
            .unwrap();
        assert_eq!(out, "bank set to 3,000.5 (total sales 8,000.5)");
    }

    #[tokio::test]
    async fn test_status_shows_grouped_totals() {
        let mut service = service().await;
        set_sales_field(&mut service, SalesField::Cash, "16000").await.unwrap();

        let out = status(&service, "Corner Shop");
        assert!(out.starts_with("Corner Shop: day open"));
        assert!(out.contains("16,000"));
        assert!(out.contains("Ready to close: yes"));
    }

    #[tokio::test]
    async fn test_close_then_history() {
        let mut service = service().await;
        set_sales_field(&mut service, SalesField::Cash, "16000").await.unwrap();

        let out = close_day(&mut service).await.unwrap();
        assert!(out.starts_with("Day closed."));
        assert!(out.contains("15,000"));

        let out = history(&service, 5).await.unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("1,000"));

        let out = start_new_day(&mut service).await.unwrap();
        assert!(out.starts_with("New day started."));
        assert_eq!(service.book().total_sales(), Money::zero());
    }

    #[tokio::test]
    async fn test_report_layout() {
        let mut service = service().await;
        set_sales_field(&mut service, SalesField::DeclaredNewDebt, "1500")
            .await
            .unwrap();
        service
            .add_debt("Ali Hassan", Money::from_units(1500))
            .await
            .unwrap();
        let report = service.close_day().await.unwrap();

        let out = render_report(&report);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[1], "  Total sales                1,500");
        assert!(lines[3].starts_with("  Commission                15,000  ("));
        assert_eq!(lines[5], "  New debts:");
        assert_eq!(lines[6], "    Ali Hassan                     1,500");
        assert_eq!(lines[7], "  Debtors carried forward: 1");
        assert!(!out.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_summary_layout() {
        let service = service().await;
        let out = render_summary("Corner Shop", &service.summary());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[1], "  Cash                           0");
        assert_eq!(lines[10], "  Ready to close: yes");
    }

    #[tokio::test]
    async fn test_empty_history_and_save() {
        let mut service = service().await;
        assert_eq!(history(&service, 7).await.unwrap(), "No closed days yet.");
        assert_eq!(save(&mut service).await.unwrap(), "Nothing to save.");
    }
}
