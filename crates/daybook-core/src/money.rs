//! # Money Module
//!
//! The `Money` type, free-text amount parsing and thousands-grouped display.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Reconciliation compares two totals for EXACT equality:                 │
//! │                                                                         │
//! │    declared new debt  ==  sum(itemized debts)                           │
//! │                                                                         │
//! │  With floats, 0.1 + 0.2 != 0.3 and a correct day could never close.    │
//! │  Amounts are held as whole hundredths (i64), so sums are exact.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use daybook_core::money::{parse_amount, Money};
//!
//! let cash = parse_amount("Rs. 16,000");
//! assert_eq!(cash, Money::from_units(16000));
//! assert_eq!(cash.to_string(), "16,000");
//!
//! // Garbage never fails, it is simply zero
//! assert_eq!(parse_amount("n/a"), Money::zero());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;

/// Minor units per display unit.
const MINOR_PER_UNIT: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in hundredths of the display unit.
///
/// Signed so that net due can go below zero on a slow day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from hundredths.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole display units.
    ///
    /// ```rust
    /// use daybook_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(8000).minor(), 800_000);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units * MINOR_PER_UNIT)
    }

    /// Returns the raw value in hundredths.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Whole display units, truncated toward zero.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / MINOR_PER_UNIT
    }

    /// Fractional hundredths, always 0-99.
    #[inline]
    pub const fn fraction(&self) -> i64 {
        (self.0 % MINOR_PER_UNIT).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Applies a rate with half-up rounding: `(amount * bps + 5000) / 10000`.
    ///
    /// ```rust
    /// use daybook_core::money::Money;
    /// use daybook_core::types::Rate;
    ///
    /// let sales = Money::from_units(16000);
    /// assert_eq!(sales.apply_rate(Rate::from_bps(500)), Money::from_units(800));
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        // i128 keeps large daily totals from overflowing mid-calculation
        let scaled = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(scaled as i64)
    }

    /// How many whole `block`s fit in this amount (floor division).
    ///
    /// Returns 0 for a zero or negative block size.
    pub fn whole_blocks(&self, block: Money) -> i64 {
        if block.0 <= 0 {
            return 0;
        }
        self.0.div_euclid(block.0)
    }

    /// Formats with thousands grouping: `1234567.5` → `"1,234,567.5"`.
    ///
    /// A zero fraction is dropped and a trailing zero in the fraction is
    /// trimmed, as en-US number formatting does.
    pub fn format_grouped(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let units = group_digits(self.units().unsigned_abs());
        let fraction = self.fraction();

        if fraction == 0 {
            format!("{sign}{units}")
        } else if fraction % 10 == 0 {
            format!("{sign}{units}.{}", fraction / 10)
        } else {
            format!("{sign}{units}.{fraction:02}")
        }
    }
}

/// Inserts `,` every three digits from the right.
fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses operator-typed text into an amount. Never fails.
///
/// ## Rules
/// - Everything except ASCII digits and `.` is discarded first, so currency
///   symbols, grouping commas, spaces and minus signs vanish.
/// - The number is the leading `digits[.digits]` run; a second `.` ends it.
/// - Fraction digits past the second are rounded half up.
/// - Empty, `.`-only and out-of-range input gives zero.
///
/// ```text
/// "5,000"      → 5000
/// "Rs 1250.75" → 1250.75
/// "1.2.3"      → 1.2
/// ".5"         → 0.5
/// "abc"        → 0
/// ```
pub fn parse_amount(raw: &str) -> Money {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut parts = cleaned.splitn(3, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();

    if whole.is_empty() && fraction.is_empty() {
        return Money::zero();
    }

    to_minor(whole, fraction)
        .map(Money::from_minor)
        .unwrap_or_default()
}

/// Combines whole and fractional digit runs into hundredths.
///
/// `None` on overflow.
fn to_minor(whole: &str, fraction: &str) -> Option<i64> {
    let mut units: i64 = 0;
    for digit in whole.bytes().map(|b| i64::from(b - b'0')) {
        units = units.checked_mul(10)?.checked_add(digit)?;
    }

    let mut digits = fraction.bytes().map(|b| i64::from(b - b'0'));
    let tenths = digits.next().unwrap_or(0);
    let hundredths = digits.next().unwrap_or(0);
    let round_up = digits.next().is_some_and(|d| d >= 5);

    let minor = tenths * 10 + hundredths + i64::from(round_up);
    units.checked_mul(MINOR_PER_UNIT)?.checked_add(minor)
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the grouped operator format, e.g. `16,000`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.format_grouped())
    }
}

// Operators saturate at the i64 bounds. Validated inputs stay far below them
// (see `MAX_AMOUNT`).

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

/// Multiplication by a count (commission units).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, count: i64) -> Self {
        Money(self.0.saturating_mul(count))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
