//! # Commission Module
//!
//! Maps a day's total sales to the commission the shop keeps.
//!
//! Two policies exist in the field and a deployment picks exactly one:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TieredFloor                         FlatRate                          │
//! │  ───────────────────────────────     ──────────────────────────────    │
//! │  units = floor(sales / 8,000)        commission = sales × 5%           │
//! │  commission = units × 600            no floor                          │
//! │  at least 15,000                                                       │
//! │                                                                         │
//! │  sales 16,000 → 1,200 → 15,000       sales 16,000 → 800                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::types::Rate;
use crate::{COMMISSION_PER_UNIT, FLAT_RATE_BPS, MIN_DAILY, UNIT_SALES};

/// Commission strategy chosen per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CommissionPolicy {
    /// Fixed amount per full block of sales, with a daily minimum.
    TieredFloor {
        unit_sales: Money,
        commission_per_unit: Money,
        min_daily: Money,
    },
    /// Straight percentage of sales.
    FlatRate { rate: Rate },
}

impl CommissionPolicy {
    /// Tiered policy with the standard 8,000 / 600 / 15,000 constants.
    pub const fn tiered() -> Self {
        CommissionPolicy::TieredFloor {
            unit_sales: Money::from_units(UNIT_SALES),
            commission_per_unit: Money::from_units(COMMISSION_PER_UNIT),
            min_daily: Money::from_units(MIN_DAILY),
        }
    }

    /// Flat policy at 5%.
    pub const fn flat() -> Self {
        CommissionPolicy::FlatRate {
            rate: Rate::from_bps(FLAT_RATE_BPS),
        }
    }

    /// Computes commission for `total_sales`.
    ///
    /// Sales are expected to be zero or more; a negative total is a caller
    /// bug and yields the policy's floor (tiered) or a negative value (flat).
    pub fn calculate(&self, total_sales: Money) -> Money {
        match *self {
            CommissionPolicy::TieredFloor {
                unit_sales,
                commission_per_unit,
                min_daily,
            } => {
                let earned = commission_per_unit * total_sales.whole_blocks(unit_sales);
                earned.max(min_daily)
            }
            CommissionPolicy::FlatRate { rate } => total_sales.apply_rate(rate),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CommissionPolicy::TieredFloor { .. } => "tiered_floor",
            CommissionPolicy::FlatRate { .. } => "flat_rate",
        }
    }
}

impl Default for CommissionPolicy {
    fn default() -> Self {
        CommissionPolicy::tiered()
    }
}

impl fmt::Display for CommissionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommissionPolicy::TieredFloor {
                unit_sales,
                commission_per_unit,
                min_daily,
            } => write!(
                f,
                "{commission_per_unit} per {unit_sales} of sales, minimum {min_daily}"
            ),
            CommissionPolicy::FlatRate { rate } => write!(f, "{rate} of sales"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiered_floor_applies_minimum() {
        let policy = CommissionPolicy::tiered();
        // floor(16000 / 8000) × 600 = 1200, raised to 15000
        assert_eq!(
            policy.calculate(Money::from_units(16000)),
            Money::from_units(15000)
        );
        assert_eq!(policy.calculate(Money::zero()), Money::from_units(15000));
    }

    #[test]
    fn test_tiered_floor_above_minimum() {
        let policy = CommissionPolicy::tiered();
        // 26 full blocks × 600 = 15600
        assert_eq!(
            policy.calculate(Money::from_units(8000 * 26 + 7999)),
            Money::from_units(15600)
        );
    }

    #[test]
    fn test_tiered_floor_ignores_partial_block() {
        let policy = CommissionPolicy::TieredFloor {
            unit_sales: Money::from_units(8000),
            commission_per_unit: Money::from_units(600),
            min_daily: Money::zero(),
        };
        assert_eq!(policy.calculate(Money::from_units(7999)), Money::zero());
        assert_eq!(
            policy.calculate(Money::from_minor(800_050)),
            Money::from_units(600)
        );
    }

    #[test]
    fn test_flat_rate_has_no_floor() {
        let policy = CommissionPolicy::flat();
        assert_eq!(
            policy.calculate(Money::from_units(16000)),
            Money::from_units(800)
        );
        assert_eq!(policy.calculate(Money::zero()), Money::zero());
    }

    #[test]
    fn test_policy_serde_tagged() {
        let json = serde_json::to_value(CommissionPolicy::flat()).unwrap();
        assert_eq!(json["policy"], "flat_rate");
        assert_eq!(json["rate"], 500);

        let back: CommissionPolicy = serde_json::from_value(json).unwrap();
        assert_eq!(back, CommissionPolicy::flat());
    }
}
