//! # Debt Ledger
//!
//! The two debt pools and the algorithms that move money between them.
//!
//! ## Pools
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   NewDebts (today)                    ActiveDebtors (carried over)     │
//! │   ─────────────────────               ─────────────────────────────    │
//! │   name → amount                       name → amount                    │
//! │   + running total                     survives day boundaries          │
//! │                                                                         │
//! │   must reconcile with the             only changed by repayments and   │
//! │   operator's declared total           by the day-close rollover        │
//! │                                                                         │
//! │                 close_day: roll_over(NewDebts → ActiveDebtors)          │
//! │                                                                         │
//! │   repay(name, x): NewDebts first ──► remainder from ActiveDebtors      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pools are never merged except for the transient [`combined_debtors`]
//! view. Every stored amount is strictly positive; an entry that reaches zero
//! is removed on the spot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::validate_positive_amount;

/// Takes up to `wanted` from the entry for `name`, pruning it when emptied.
///
/// Returns how much was actually taken.
fn take_from(entries: &mut BTreeMap<String, Money>, name: &str, wanted: Money) -> Money {
    let Some(owed) = entries.get_mut(name) else {
        return Money::zero();
    };

    let taken = wanted.min(*owed).max(Money::zero());
    *owed -= taken;
    if !owed.is_positive() {
        entries.remove(name);
    }
    taken
}

/// Drops every zero or negative entry.
fn prune(entries: &mut BTreeMap<String, Money>) {
    entries.retain(|_, amount| amount.is_positive());
}

// =============================================================================
// New Debts
// =============================================================================

/// Today's itemized credit sales with an incrementally kept total.
///
/// Serialized as a plain `name → amount` map; the total is rebuilt on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Money>", into = "BTreeMap<String, Money>")]
pub struct NewDebts {
    entries: BTreeMap<String, Money>,
    total: Money,
}

impl NewDebts {
    /// Adds to a customer's entry, creating it when absent.
    ///
    /// Callers validate `amount > 0` first.
    pub fn add(&mut self, name: &str, amount: Money) -> Money {
        let entry = self.entries.entry(name.to_string()).or_default();
        *entry += amount;
        self.total += amount;
        *entry
    }

    /// Removes the entry and returns what it held.
    pub fn remove(&mut self, name: &str) -> Option<Money> {
        let amount = self.entries.remove(name)?;
        self.total -= amount;
        Some(amount)
    }

    /// Deducts up to `wanted` and returns the amount deducted.
    pub fn deduct(&mut self, name: &str, wanted: Money) -> Money {
        let taken = take_from(&mut self.entries, name, wanted);
        self.total -= taken;
        taken
    }

    /// What `name` owes from today's credit sales.
    pub fn get(&self, name: &str) -> Money {
        self.entries.get(name).copied().unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The running detailed total.
    #[inline]
    pub fn total(&self) -> Money {
        self.total
    }

    /// Sum of entries computed from scratch. Always equals [`Self::total`].
    pub fn recomputed_total(&self) -> Money {
        self.entries.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Money)> {
        self.entries.iter().map(|(name, amount)| (name.as_str(), *amount))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owned copy of the entries, for reports and projections.
    pub fn snapshot(&self) -> BTreeMap<String, Money> {
        self.entries.clone()
    }
}

impl From<BTreeMap<String, Money>> for NewDebts {
    fn from(mut entries: BTreeMap<String, Money>) -> Self {
        prune(&mut entries);
        let total = entries.values().sum();
        NewDebts { entries, total }
    }
}

impl From<NewDebts> for BTreeMap<String, Money> {
    fn from(debts: NewDebts) -> Self {
        debts.entries
    }
}

// =============================================================================
// Active Debtors
// =============================================================================

/// Debt carried over from previous closed days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Money>", into = "BTreeMap<String, Money>")]
pub struct ActiveDebtors {
    entries: BTreeMap<String, Money>,
}

impl ActiveDebtors {
    /// Increases a customer's carried debt.
    pub fn credit(&mut self, name: &str, amount: Money) {
        *self.entries.entry(name.to_string()).or_default() += amount;
    }

    /// Deducts up to `wanted` and returns the amount deducted.
    pub fn deduct(&mut self, name: &str, wanted: Money) -> Money {
        take_from(&mut self.entries, name, wanted)
    }

    pub fn get(&self, name: &str) -> Money {
        self.entries.get(name).copied().unwrap_or_default()
    }

    /// Removes zero or negative entries.
    pub fn prune(&mut self) {
        prune(&mut self.entries);
    }

    pub fn total(&self) -> Money {
        self.entries.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Money)> {
        self.entries.iter().map(|(name, amount)| (name.as_str(), *amount))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> BTreeMap<String, Money> {
        self.entries.clone()
    }
}

/// Loading prunes stale non-positive rows.
impl From<BTreeMap<String, Money>> for ActiveDebtors {
    fn from(mut entries: BTreeMap<String, Money>) -> Self {
        prune(&mut entries);
        ActiveDebtors { entries }
    }
}

impl From<ActiveDebtors> for BTreeMap<String, Money> {
    fn from(debtors: ActiveDebtors) -> Self {
        debtors.entries
    }
}

impl FromIterator<(String, Money)> for ActiveDebtors {
    fn from_iter<I: IntoIterator<Item = (String, Money)>>(iter: I) -> Self {
        let mut debtors = ActiveDebtors::default();
        for (name, amount) in iter {
            debtors.credit(&name, amount);
        }
        debtors.prune();
        debtors
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

/// Outcome of comparing the declared new-debt total with the itemized total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reconciliation {
    /// `declared == detailed`; the day may close.
    Matched,
    /// More itemized than declared.
    OverDetailed { surplus: Money },
    /// Less itemized than declared.
    UnderDetailed { shortfall: Money },
}

impl Reconciliation {
    /// Compares the two totals. A zero declared total with nothing itemized is
    /// simply `0 == 0`, so it needs no special case.
    pub fn check(declared: Money, detailed: Money) -> Self {
        match detailed.cmp(&declared) {
            std::cmp::Ordering::Equal => Reconciliation::Matched,
            std::cmp::Ordering::Greater => Reconciliation::OverDetailed {
                surplus: detailed - declared,
            },
            std::cmp::Ordering::Less => Reconciliation::UnderDetailed {
                shortfall: declared - detailed,
            },
        }
    }

    #[inline]
    pub fn is_matched(&self) -> bool {
        matches!(self, Reconciliation::Matched)
    }

    /// Signed `detailed - declared`: positive surplus, negative shortfall.
    pub fn delta(&self) -> Money {
        match *self {
            Reconciliation::Matched => Money::zero(),
            Reconciliation::OverDetailed { surplus } => surplus,
            Reconciliation::UnderDetailed { shortfall } => -shortfall,
        }
    }
}

impl fmt::Display for Reconciliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reconciliation::Matched => f.write_str("itemized debts match the declared total"),
            Reconciliation::OverDetailed { surplus } => {
                write!(f, "itemized debts exceed the declared total by {surplus}")
            }
            Reconciliation::UnderDetailed { shortfall } => {
                write!(f, "itemized debts are short by {shortfall}")
            }
        }
    }
}

// =============================================================================
// Repayment
// =============================================================================

/// What a repayment actually did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Repayment {
    pub name: String,
    /// Amount the operator entered.
    pub requested: Money,
    /// Amount booked, clamped to what the customer owed.
    pub applied: Money,
    pub from_new_debts: Money,
    pub from_active_debtors: Money,
    /// Customer's total debt after the repayment.
    pub remaining: Money,
}

impl Repayment {
    /// `true` when part of the request was discarded because it exceeded the
    /// debt. There is no customer credit balance.
    pub fn was_clamped(&self) -> bool {
        self.applied < self.requested
    }

    /// The discarded part of the request.
    pub fn excess(&self) -> Money {
        self.requested - self.applied
    }
}

/// Applies a repayment across both pools.
///
/// ## Order
/// 1. Clamp the request to the customer's total debt (new + active).
/// 2. Take from today's new debts first.
/// 3. Take whatever is left from the carried-over pool.
///
/// Rejects a non-positive amount and a customer who owes nothing; in both
/// cases neither pool is touched.
pub fn apply_repayment(
    new_debts: &mut NewDebts,
    active: &mut ActiveDebtors,
    name: &str,
    requested: Money,
) -> CoreResult<Repayment> {
    validate_positive_amount(requested, "repayment amount")?;

    let owed = new_debts.get(name) + active.get(name);
    if !owed.is_positive() {
        return Err(CoreError::NoDebtOwed {
            name: name.to_string(),
        });
    }

    let applied = requested.min(owed);
    let from_new_debts = new_debts.deduct(name, applied);
    let from_active_debtors = active.deduct(name, applied - from_new_debts);

    Ok(Repayment {
        name: name.to_string(),
        requested,
        applied,
        from_new_debts,
        from_active_debtors,
        remaining: owed - applied,
    })
}

/// Moves today's settled new debts into the carried-over pool.
pub fn roll_over(new_debts: &NewDebts, active: &mut ActiveDebtors) {
    for (name, amount) in new_debts.iter().filter(|(_, amount)| amount.is_positive()) {
        active.credit(name, amount);
    }
    active.prune();
}

// =============================================================================
// Combined View
// =============================================================================

/// One customer in the combined debtor list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DebtorLine {
    pub name: String,
    pub new_debt: Money,
    pub carried_debt: Money,
    pub total: Money,
}

/// Active pool ∪ today's new debts, summed per name, sorted by name.
///
/// Display only; the pools themselves stay separate.
pub fn combined_debtors(new_debts: &NewDebts, active: &ActiveDebtors) -> Vec<DebtorLine> {
    let mut lines: BTreeMap<&str, (Money, Money)> = BTreeMap::new();
    for (name, amount) in active.iter() {
        lines.entry(name).or_default().1 += amount;
    }
    for (name, amount) in new_debts.iter() {
        lines.entry(name).or_default().0 += amount;
    }

    lines
        .into_iter()
        .map(|(name, (new_debt, carried_debt))| DebtorLine {
            name: name.to_string(),
            new_debt,
            carried_debt,
            total: new_debt + carried_debt,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn units(n: i64) -> Money {
        Money::from_units(n)
    }

    #[test]
    fn test_new_debts_total_tracks_entries() {
        let mut debts = NewDebts::default();
        debts.add("Ali Hassan", units(500));
        debts.add("Sara Ahmed", units(300));
        debts.add("Ali Hassan", units(200));
        assert_eq!(debts.get("Ali Hassan"), units(700));
        assert_eq!(debts.total(), units(1000));
        assert_eq!(debts.total(), debts.recomputed_total());

        assert_eq!(debts.remove("Ali Hassan"), Some(units(700)));
        assert_eq!(debts.remove("Ali Hassan"), None);
        assert_eq!(debts.total(), units(300));
        assert_eq!(debts.total(), debts.recomputed_total());
    }

    #[test]
    fn test_deduct_prunes_emptied_entry() {
        let mut debts = NewDebts::default();
        debts.add("Sara Ahmed", units(300));
        assert_eq!(debts.deduct("Sara Ahmed", units(500)), units(300));
        assert!(!debts.contains("Sara Ahmed"));
        assert_eq!(debts.total(), Money::zero());
        assert_eq!(debts.deduct("Nobody Here", units(5)), Money::zero());
    }

    #[test]
    fn test_new_debts_serde_rebuilds_total() {
        let json = r#"{"Ali Hassan": 50000, "Ghost Entry": 0}"#;
        let debts: NewDebts = serde_json::from_str(json).unwrap();
        assert_eq!(debts.len(), 1);
        assert_eq!(debts.total(), units(500));
    }

    #[test]
    fn test_active_debtors_load_prunes() {
        let json = r#"{"Sara Ahmed": 20000, "Paid Off": 0, "Odd Row": -100}"#;
        let debtors: ActiveDebtors = serde_json::from_str(json).unwrap();
        assert_eq!(debtors.len(), 1);
        assert_eq!(debtors.get("Sara Ahmed"), units(200));
    }

    #[test]
    fn test_reconciliation_three_way() {
        assert_eq!(
            Reconciliation::check(units(8000), units(8000)),
            Reconciliation::Matched
        );
        assert_eq!(
            Reconciliation::check(Money::zero(), Money::zero()),
            Reconciliation::Matched
        );
        assert_eq!(
            Reconciliation::check(units(8000), units(8500)),
            Reconciliation::OverDetailed { surplus: units(500) }
        );
        assert_eq!(
            Reconciliation::check(units(8000), units(7000)),
            Reconciliation::UnderDetailed {
                shortfall: units(1000)
            }
        );
    }

    #[test]
    fn test_repay_new_pool_first_then_active() {
        let mut new_debts = NewDebts::default();
        new_debts.add("Sara Ahmed", units(300));
        let mut active: ActiveDebtors = [("Sara Ahmed".to_string(), units(500))]
            .into_iter()
            .collect();

        let repayment =
            apply_repayment(&mut new_debts, &mut active, "Sara Ahmed", units(600)).unwrap();

        assert_eq!(repayment.applied, units(600));
        assert_eq!(repayment.from_new_debts, units(300));
        assert_eq!(repayment.from_active_debtors, units(300));
        assert_eq!(repayment.remaining, units(200));
        assert!(!repayment.was_clamped());

        assert!(!new_debts.contains("Sara Ahmed"));
        assert_eq!(new_debts.total(), Money::zero());
        assert_eq!(active.get("Sara Ahmed"), units(200));
    }

    #[test]
    fn test_repay_clamps_to_total_debt() {
        let mut new_debts = NewDebts::default();
        let mut active: ActiveDebtors = [("Sara Ahmed".to_string(), units(500))]
            .into_iter()
            .collect();

        let repayment =
            apply_repayment(&mut new_debts, &mut active, "Sara Ahmed", units(900)).unwrap();

        assert_eq!(repayment.applied, units(500));
        assert_eq!(repayment.excess(), units(400));
        assert!(repayment.was_clamped());
        assert_eq!(repayment.remaining, Money::zero());
        assert!(active.is_empty());
    }

    #[test]
    fn test_repay_rejections_leave_pools_untouched() {
        let mut new_debts = NewDebts::default();
        new_debts.add("Ali Hassan", units(100));
        let mut active = ActiveDebtors::default();
        let before = (new_debts.clone(), active.clone());

        let err = apply_repayment(&mut new_debts, &mut active, "X Y", units(100)).unwrap_err();
        assert!(matches!(err, CoreError::NoDebtOwed { .. }));

        let err =
            apply_repayment(&mut new_debts, &mut active, "Ali Hassan", Money::zero()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));

        assert_eq!((new_debts, active), before);
    }

    #[test]
    fn test_roll_over_adds_to_existing() {
        let mut new_debts = NewDebts::default();
        new_debts.add("Ali Hassan", units(8000));
        new_debts.add("Sara Ahmed", units(300));
        let mut active: ActiveDebtors = [("Sara Ahmed".to_string(), units(200))]
            .into_iter()
            .collect();

        roll_over(&new_debts, &mut active);

        assert_eq!(active.get("Ali Hassan"), units(8000));
        assert_eq!(active.get("Sara Ahmed"), units(500));
        assert_eq!(active.total(), units(8500));
    }

    #[test]
    fn test_combined_debtors_sums_per_name() {
        let mut new_debts = NewDebts::default();
        new_debts.add("Sara Ahmed", units(300));
        new_debts.add("Ali Hassan", units(100));
        let active: ActiveDebtors = [
            ("Sara Ahmed".to_string(), units(500)),
            ("Bilal Khan".to_string(), units(50)),
        ]
        .into_iter()
        .collect();

        let lines = combined_debtors(&new_debts, &active);
        let names: Vec<_> = lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Ali Hassan", "Bilal Khan", "Sara Ahmed"]);

        let sara = &lines[2];
        assert_eq!(sara.new_debt, units(300));
        assert_eq!(sara.carried_debt, units(500));
        assert_eq!(sara.total, units(800));
    }
}
