//! # Validation Module
//!
//! Input rules applied before a ledger mutation runs.
//!
//! Customer names are the keys of both debt pools, so they are normalized
//! (trimmed, inner whitespace collapsed) before they are checked or used.
//! `"Ali  Hassan "` and `"Ali Hassan"` are the same customer.
//!
//! ```rust
//! use daybook_core::types::NameRule;
//! use daybook_core::validation::validate_customer_name;
//!
//! assert_eq!(
//!     validate_customer_name("  Ali   Hassan ", NameRule::FullName).unwrap(),
//!     "Ali Hassan"
//! );
//! assert!(validate_customer_name("Mohammed", NameRule::FullName).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::NameRule;
use crate::MAX_AMOUNT;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum words in a full customer name.
pub const MIN_NAME_WORDS: usize = 2;

/// Trims and collapses whitespace runs to single spaces.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validates and normalizes a customer name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Under [`NameRule::FullName`], must contain at least two words
pub fn validate_customer_name(raw: &str, rule: NameRule) -> ValidationResult<String> {
    let name = normalize_name(raw);

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }

    if rule == NameRule::FullName && name.split(' ').count() < MIN_NAME_WORDS {
        return Err(ValidationError::TooFewWords {
            field: "customer name".to_string(),
            min: MIN_NAME_WORDS,
        });
    }

    Ok(name)
}

/// Validates an amount that must be strictly positive (debts, repayments).
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_AMOUNT`]
pub fn validate_positive_amount(amount: Money, field: &str) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    validate_within_max(amount, field)
}

/// Validates a sales figure, which may be zero but never negative.
pub fn validate_sales_amount(amount: Money, field: &str) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    validate_within_max(amount, field)
}

/// Rejects an amount or running total above [`MAX_AMOUNT`].
pub fn validate_within_max(amount: Money, field: &str) -> ValidationResult<()> {
    let max = Money::from_units(MAX_AMOUNT);
    if amount > max {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Sara \t Ahmed  "), "Sara Ahmed");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn test_full_name_rule() {
        assert!(validate_customer_name("Ali Hassan", NameRule::FullName).is_ok());
        assert!(validate_customer_name("Ali bin Hassan", NameRule::FullName).is_ok());

        let err = validate_customer_name("Mohammed", NameRule::FullName).unwrap_err();
        assert!(matches!(err, ValidationError::TooFewWords { min: 2, .. }));

        let err = validate_customer_name("   ", NameRule::FullName).unwrap_err();
        assert!(matches!(err, ValidationError::Required { .. }));
    }

    #[test]
    fn test_non_empty_rule() {
        assert_eq!(
            validate_customer_name(" Mohammed ", NameRule::NonEmpty).unwrap(),
            "Mohammed"
        );
        assert!(validate_customer_name("", NameRule::NonEmpty).is_err());
    }

    #[test]
    fn test_amount_rules() {
        assert!(validate_positive_amount(Money::from_units(1), "amount").is_ok());
        assert!(validate_positive_amount(Money::zero(), "amount").is_err());
        assert!(validate_positive_amount(Money::from_units(-5), "amount").is_err());

        assert!(validate_sales_amount(Money::zero(), "cash").is_ok());
        assert!(validate_sales_amount(Money::from_units(-1), "cash").is_err());
    }

    #[test]
    fn test_amount_ceiling() {
        let max = Money::from_units(MAX_AMOUNT);
        assert!(validate_sales_amount(max, "cash").is_ok());
        assert!(validate_positive_amount(max, "debt amount").is_ok());

        let over = max + Money::from_minor(1);
        let err = validate_sales_amount(over, "cash").unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
        assert_eq!(err.to_string(), "cash cannot exceed 1,000,000,000,000");
        assert!(validate_positive_amount(over, "debt amount").is_err());
    }
}
