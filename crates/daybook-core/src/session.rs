//! # Day Session
//!
//! The live day's figures and the [`DayBook`] aggregate that owns them
//! together with the carried-over debtor pool.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cash 5,000   bank 3,000   declared new debt 8,000                      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  total sales = 16,000 (derived, never entered)                          │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  add_debt("Ali Hassan", 8,000) ──► detailed 8,000 == declared ✓         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  close_day ──► rollover into ActiveDebtors ──► DailyReport             │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  start_new_day ──► fresh Open session, debtors kept                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation validates first and mutates last, so an `Err` means
//! nothing changed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use uuid::Uuid;

use crate::commission::CommissionPolicy;
use crate::error::{CoreError, CoreResult};
use crate::ledger::{
    apply_repayment, combined_debtors, roll_over, ActiveDebtors, DebtorLine, NewDebts,
    Reconciliation, Repayment,
};
use crate::money::{parse_amount, Money};
use crate::types::{DayStatus, NameRule, SalesField};
use crate::validation::{
    normalize_name, validate_customer_name, validate_positive_amount, validate_sales_amount,
    validate_within_max,
};

// =============================================================================
// Day Session
// =============================================================================

/// One business day's figures.
///
/// Stored sessions that predate a field load with that field defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySession {
    pub id: Uuid,
    #[serde(default)]
    pub cash: Money,
    #[serde(default)]
    pub bank: Money,
    #[serde(default)]
    pub declared_new_debt: Money,
    #[serde(default)]
    pub new_debts: NewDebts,
    #[serde(default)]
    pub total_repaid: Money,
    #[serde(default)]
    pub status: DayStatus,
    pub opened_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl DaySession {
    /// A fresh, empty, open session.
    pub fn open(id: Uuid, opened_at: DateTime<Utc>) -> Self {
        DaySession {
            id,
            cash: Money::zero(),
            bank: Money::zero(),
            declared_new_debt: Money::zero(),
            new_debts: NewDebts::default(),
            total_repaid: Money::zero(),
            status: DayStatus::Open,
            opened_at,
            closed_at: None,
        }
    }

    /// `cash + bank + declared_new_debt`.
    #[inline]
    pub fn total_sales(&self) -> Money {
        self.cash + self.bank + self.declared_new_debt
    }

    pub fn reconciliation(&self) -> Reconciliation {
        Reconciliation::check(self.declared_new_debt, self.new_debts.total())
    }

    pub fn is_open(&self) -> bool {
        self.status == DayStatus::Open
    }

    fn sales_field_mut(&mut self, field: SalesField) -> &mut Money {
        match field {
            SalesField::Cash => &mut self.cash,
            SalesField::Bank => &mut self.bank,
            SalesField::DeclaredNewDebt => &mut self.declared_new_debt,
        }
    }
}

// =============================================================================
// Daily Report
// =============================================================================

/// Immutable record of a closed day. Append-only once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyReport {
    #[ts(as = "String")]
    pub id: Uuid,
    #[ts(as = "String")]
    pub session_id: Uuid,
    #[ts(as = "String")]
    pub closed_at: DateTime<Utc>,
    pub cash: Money,
    pub bank: Money,
    pub declared_new_debt: Money,
    pub total_sales: Money,
    pub total_repaid: Money,
    pub commission: Money,
    pub commission_policy: CommissionPolicy,
    pub net_due: Money,
    /// Today's itemized debts as they were before the rollover.
    pub new_debts: BTreeMap<String, Money>,
    /// Carried-over pool after the rollover.
    pub active_debtors: BTreeMap<String, Money>,
}

// =============================================================================
// Projections
// =============================================================================

/// Read-only snapshot for whatever renders the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DaySummary {
    pub status: DayStatus,
    pub cash: Money,
    pub bank: Money,
    pub declared_new_debt: Money,
    pub detailed_new_debt: Money,
    pub total_sales: Money,
    pub total_repaid: Money,
    pub commission: Money,
    pub net_due: Money,
    pub reconciliation: Reconciliation,
    pub can_close: bool,
    /// Today's itemized debts, sorted by name.
    pub new_debts: Vec<(String, Money)>,
    /// Active pool plus today's outstanding debts, summed per name. After
    /// the close today's debts are already part of the active pool.
    pub debtors: Vec<DebtorLine>,
}

/// One customer's debt split across the pools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerDebt {
    pub name: String,
    pub new_debt: Money,
    pub carried_debt: Money,
    pub total: Money,
}

// =============================================================================
// Day Book
// =============================================================================

/// The day session plus the carried-over debtor pool, under one commission
/// policy. All ledger mutations go through here.
#[derive(Debug, Clone)]
pub struct DayBook {
    session: DaySession,
    active: ActiveDebtors,
    policy: CommissionPolicy,
    name_rule: NameRule,
}

impl DayBook {
    pub fn new(session: DaySession, active: ActiveDebtors, policy: CommissionPolicy) -> Self {
        DayBook {
            session,
            active,
            policy,
            name_rule: NameRule::default(),
        }
    }

    /// Overrides the customer name rule (strict full name by default).
    pub fn with_name_rule(mut self, rule: NameRule) -> Self {
        self.name_rule = rule;
        self
    }

    pub fn session(&self) -> &DaySession {
        &self.session
    }

    pub fn active_debtors(&self) -> &ActiveDebtors {
        &self.active
    }

    pub fn policy(&self) -> CommissionPolicy {
        self.policy
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.session.is_open() {
            Ok(())
        } else {
            Err(CoreError::DayClosed)
        }
    }

    // -------------------------------------------------------------------------
    // Sales input
    // -------------------------------------------------------------------------

    /// Sets one of the operator-entered figures.
    pub fn set_sales_field(&mut self, field: SalesField, amount: Money) -> CoreResult<()> {
        self.ensure_open()?;
        validate_sales_amount(amount, field.label())?;
        *self.session.sales_field_mut(field) = amount;
        Ok(())
    }

    /// Sets a figure from raw operator text. Unparseable text counts as zero.
    pub fn enter_sales_field(&mut self, field: SalesField, raw: &str) -> CoreResult<Money> {
        let amount = parse_amount(raw);
        self.set_sales_field(field, amount)?;
        Ok(amount)
    }

    pub fn set_cash(&mut self, amount: Money) -> CoreResult<()> {
        self.set_sales_field(SalesField::Cash, amount)
    }

    pub fn set_bank(&mut self, amount: Money) -> CoreResult<()> {
        self.set_sales_field(SalesField::Bank, amount)
    }

    pub fn set_declared_new_debt(&mut self, amount: Money) -> CoreResult<()> {
        self.set_sales_field(SalesField::DeclaredNewDebt, amount)
    }

    // -------------------------------------------------------------------------
    // Itemized debts
    // -------------------------------------------------------------------------

    /// Records a credit sale against a customer.
    ///
    /// Overshooting the declared total is allowed; it only shows up in
    /// [`Self::reconciliation`]. Returns the customer's new-debt entry.
    pub fn add_debt(&mut self, name: &str, amount: Money) -> CoreResult<Money> {
        self.ensure_open()?;
        let name = validate_customer_name(name, self.name_rule)?;
        validate_positive_amount(amount, "debt amount")?;
        validate_within_max(self.session.new_debts.total() + amount, "new debt total")?;
        Ok(self.session.new_debts.add(&name, amount))
    }

    /// Removes a customer's itemized debt after `confirm` approves it.
    ///
    /// `confirm` receives the normalized name and the amount about to be
    /// dropped. `Ok(None)` means the operator declined and nothing changed.
    pub fn remove_debt<F>(&mut self, name: &str, confirm: F) -> CoreResult<Option<Money>>
    where
        F: FnOnce(&str, Money) -> bool,
    {
        self.ensure_open()?;
        let name = normalize_name(name);
        if !self.session.new_debts.contains(&name) {
            return Err(CoreError::NotFound { name });
        }

        let amount = self.session.new_debts.get(&name);
        if !confirm(&name, amount) {
            return Ok(None);
        }
        Ok(self.session.new_debts.remove(&name))
    }

    /// Books a repayment, new-debt pool first.
    ///
    /// `total_repaid` grows by the clamped amount, not the requested one.
    pub fn repay(&mut self, name: &str, amount: Money) -> CoreResult<Repayment> {
        self.ensure_open()?;
        let name = normalize_name(name);
        let owed = self.session.new_debts.get(&name) + self.active.get(&name);
        validate_within_max(self.session.total_repaid + amount.min(owed), "total repaid")?;
        let repayment = apply_repayment(
            &mut self.session.new_debts,
            &mut self.active,
            &name,
            amount,
        )?;
        self.session.total_repaid += repayment.applied;
        Ok(repayment)
    }

    // -------------------------------------------------------------------------
    // Derived figures
    // -------------------------------------------------------------------------

    pub fn total_sales(&self) -> Money {
        self.session.total_sales()
    }

    pub fn reconciliation(&self) -> Reconciliation {
        self.session.reconciliation()
    }

    pub fn can_close(&self) -> bool {
        self.session.is_open() && self.reconciliation().is_matched()
    }

    pub fn commission(&self) -> Money {
        self.policy.calculate(self.total_sales())
    }

    /// `total_sales + total_repaid - commission`. May be negative.
    pub fn net_due(&self) -> Money {
        self.total_sales() + self.session.total_repaid - self.commission()
    }

    /// Today's debts still owed on their own.
    ///
    /// Empty once the day is closed: the close has already credited them to
    /// the carried-over pool.
    fn outstanding_new_debts(&self) -> Option<&NewDebts> {
        self.session.is_open().then_some(&self.session.new_debts)
    }

    pub fn customer_debt(&self, name: &str) -> CustomerDebt {
        let name = normalize_name(name);
        let new_debt = self
            .outstanding_new_debts()
            .map(|debts| debts.get(&name))
            .unwrap_or_default();
        let carried_debt = self.active.get(&name);
        CustomerDebt {
            name,
            new_debt,
            carried_debt,
            total: new_debt + carried_debt,
        }
    }

    pub fn summary(&self) -> DaySummary {
        let rolled_over = NewDebts::default();
        let outstanding = self.outstanding_new_debts().unwrap_or(&rolled_over);
        DaySummary {
            status: self.session.status,
            cash: self.session.cash,
            bank: self.session.bank,
            declared_new_debt: self.session.declared_new_debt,
            detailed_new_debt: self.session.new_debts.total(),
            total_sales: self.total_sales(),
            total_repaid: self.session.total_repaid,
            commission: self.commission(),
            net_due: self.net_due(),
            reconciliation: self.reconciliation(),
            can_close: self.can_close(),
            new_debts: self
                .session
                .new_debts
                .iter()
                .map(|(name, amount)| (name.to_string(), amount))
                .collect(),
            debtors: combined_debtors(outstanding, &self.active),
        }
    }

    // -------------------------------------------------------------------------
    // Day transitions
    // -------------------------------------------------------------------------

    /// Closes the day when the debts reconcile.
    ///
    /// On success today's debts are rolled into the carried-over pool, the
    /// session is marked closed and the report is returned for the caller to
    /// persist. On failure nothing changes.
    pub fn close_day(&mut self, report_id: Uuid, now: DateTime<Utc>) -> CoreResult<DailyReport> {
        self.ensure_open()?;
        let reconciliation = self.reconciliation();
        if !reconciliation.is_matched() {
            return Err(CoreError::NotReconciled { reconciliation });
        }

        let new_debts = self.session.new_debts.snapshot();
        roll_over(&self.session.new_debts, &mut self.active);

        let report = DailyReport {
            id: report_id,
            session_id: self.session.id,
            closed_at: now,
            cash: self.session.cash,
            bank: self.session.bank,
            declared_new_debt: self.session.declared_new_debt,
            total_sales: self.total_sales(),
            total_repaid: self.session.total_repaid,
            commission: self.commission(),
            commission_policy: self.policy,
            net_due: self.net_due(),
            new_debts,
            active_debtors: self.active.snapshot(),
        };

        self.session.status = DayStatus::Closed;
        self.session.closed_at = Some(now);
        Ok(report)
    }

    /// Replaces a closed session with a fresh open one. Debtors are kept.
    pub fn start_new_day(&mut self, session_id: Uuid, now: DateTime<Utc>) -> CoreResult<()> {
        if self.session.is_open() {
            return Err(CoreError::DayStillOpen);
        }
        self.session = DaySession::open(session_id, now);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
