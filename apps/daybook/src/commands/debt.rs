//! # Debt Commands
//!
//! Itemized credit sales, repayments and the combined debtor list.

use daybook_core::{Money, Repayment};
use daybook_db::PersistenceGateway;

use crate::error::AppResult;
use crate::service::DayBookService;

/// Records a credit sale.
///
/// ## Example
/// ```text
/// > add 1,500 Ali Hassan
/// Ali Hassan now owes 1,500 from today (itemized 1,500 of 8,000 declared)
/// ```
pub async fn add_debt<G: PersistenceGateway>(
    service: &mut DayBookService<G>,
    name: &str,
    amount: Money,
) -> AppResult<String> {
    service.add_debt(name, amount).await?;
    let debt = service.customer_debt(name);
    let summary = service.summary();
    Ok(format!(
        "{} now owes {} from today (itemized {} of {} declared)",
        debt.name, debt.new_debt, summary.detailed_new_debt, summary.declared_new_debt
    ))
}

/// Removes a customer's itemized debt once the operator has answered.
///
/// `confirmed` is the operator's answer to the prompt the shell showed.
pub async fn remove_debt<G: PersistenceGateway>(
    service: &mut DayBookService<G>,
    name: &str,
    confirmed: bool,
) -> AppResult<String> {
    let removed = service.remove_debt(name, |_, _| confirmed).await?;
    let name = service.customer_debt(name).name;
    Ok(match removed {
        Some(amount) => format!("Removed {amount} owed by {name}."),
        None => "Kept.".to_string(),
    })
}

pub async fn repay<G: PersistenceGateway>(
    service: &mut DayBookService<G>,
    name: &str,
    amount: Money,
) -> AppResult<String> {
    let repayment = service.repay(name, amount).await?;
    Ok(render_repayment(&repayment))
}

/// Everyone who owes money, with today's and carried debt apart.
pub fn debtors<G: PersistenceGateway>(service: &DayBookService<G>) -> String {
    let lines = service.summary().debtors;
    if lines.is_empty() {
        return "Nobody owes anything.".to_string();
    }

    let mut rows = vec![format!(
        "  {:<24}{:>12}{:>12}{:>12}",
        "Customer", "Today", "Carried", "Total"
    )];
    rows.extend(lines.iter().map(|line| {
        format!(
            "  {:<24}{:>12}{:>12}{:>12}",
            line.name, line.new_debt, line.carried_debt, line.total
        )
    }));
    let total: Money = lines.iter().map(|line| line.total).sum();
    rows.push(format!("  {:<24}{:>36}", "All debtors", total));
    rows.join("\n")
}

pub fn render_repayment(repayment: &Repayment) -> String {
    let clamped = if repayment.was_clamped() {
        format!(
            " (asked {}, only {} was owed; {} not booked)",
            repayment.requested,
            repayment.applied,
            repayment.excess()
        )
    } else {
        String::new()
    };
    let outcome = if repayment.remaining.is_zero() {
        ", debt cleared.".to_string()
    } else {
        format!(", still owes {}.", repayment.remaining)
    };
    format!(
        "{} repaid {}{clamped}{outcome}",
        repayment.name, repayment.applied
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use daybook_core::{ActiveDebtors, CommissionPolicy, DaySession, NameRule};
    use daybook_db::MemoryGateway;
    use uuid::Uuid;

    fn units(n: i64) -> Money {
        Money::from_units(n)
    }

    async fn service_with_carried(name: &str, amount: Money) -> DayBookService<MemoryGateway> {
        let debtors: ActiveDebtors = [(name.to_string(), amount)].into_iter().collect();
        let gateway = MemoryGateway::with_state(
            Some(DaySession::open(Uuid::new_v4(), Utc::now())),
            debtors,
        );
        DayBookService::start(gateway, CommissionPolicy::default(), NameRule::FullName)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_and_remove() {
        let mut service = service_with_carried("Sara Ahmed", units(300)).await;

        let out = add_debt(&mut service, "Ali  Hassan", units(1500)).await.unwrap();
        assert_eq!(out, "Ali Hassan now owes 1,500 from today (itemized 1,500 of 0 declared)");

        assert_eq!(remove_debt(&mut service, "Ali Hassan", false).await.unwrap(), "Kept.");
        assert_eq!(
            remove_debt(&mut service, "Ali Hassan", true).await.unwrap(),
            "Removed 1,500 owed by Ali Hassan."
        );
    }

    #[tokio::test]
    async fn test_repay_clamped_output() {
        let mut service = service_with_carried("Sara Ahmed", units(300)).await;

        let out = repay(&mut service, "Sara Ahmed", units(500)).await.unwrap();
        assert_eq!(
            out,
            "Sara Ahmed repaid 300 (asked 500, only 300 was owed; 200 not booked), debt cleared."
        );
    }

    #[tokio::test]
    async fn test_partial_repayment_output() {
        let mut service = service_with_carried("Sara Ahmed", units(300)).await;
        let out = repay(&mut service, "Sara Ahmed", units(120)).await.unwrap();
        assert_eq!(out, "Sara Ahmed repaid 120, still owes 180.");
    }

    #[tokio::test]
    async fn test_debtors_listing() {
        let mut service = service_with_carried("Sara Ahmed", units(300)).await;
        service.add_debt("Sara Ahmed", units(200)).await.unwrap();

        let out = debtors(&service);
        let row = out.lines().nth(1).unwrap();
        assert!(row.contains("Sara Ahmed"));
        assert!(row.contains("200"));
        assert!(row.contains("300"));
        assert!(row.contains("500"));
        assert_eq!(out.lines().count(), 3);
        assert!(out.lines().last().unwrap().ends_with("500"));
    }

    #[tokio::test]
    async fn test_no_debtors() {
        let service = service_with_carried("Sara Ahmed", Money::zero()).await;
        assert_eq!(debtors(&service), "Nobody owes anything.");
    }
}
