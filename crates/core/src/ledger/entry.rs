//! Signed-amount policy for ledger entries.
//!
//! Clients submit an unsigned magnitude plus an entry kind; the server signs
//! the amount itself (`expense` negates, `income` keeps it positive). A
//! client-supplied sign is never trusted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum number of decimal places for currency amounts.
pub const CURRENCY_SCALE: u32 = 2;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Increases the account balance.
    Income,
    /// Decreases the account balance.
    Expense,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for EntryKind {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EntryError::UnknownKind(other.to_string())),
        }
    }
}

/// Errors for ledger entry validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    /// Amount must be strictly positive.
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Amount has more decimal places than the currency allows.
    #[error("amount {0} exceeds {CURRENCY_SCALE} decimal places")]
    ExcessivePrecision(Decimal),

    /// Unrecognized entry kind.
    #[error("unknown entry kind '{0}', expected 'income' or 'expense'")]
    UnknownKind(String),
}

/// Validates a client-supplied magnitude and signs it by entry kind.
///
/// The magnitude must be strictly positive and carry at most
/// [`CURRENCY_SCALE`] decimal places. `Expense` negates; `Income` keeps the
/// value positive.
///
/// # Errors
///
/// Returns `EntryError::NonPositiveAmount` or `EntryError::ExcessivePrecision`
/// when validation fails.
pub fn signed_amount(kind: EntryKind, magnitude: Decimal) -> Result<Decimal, EntryError> {
    if magnitude <= Decimal::ZERO {
        return Err(EntryError::NonPositiveAmount(magnitude));
    }
    // normalize() strips trailing zeros so "1.100" passes as 1.1
    if magnitude.normalize().scale() > CURRENCY_SCALE {
        return Err(EntryError::ExcessivePrecision(magnitude));
    }

    Ok(match kind {
        EntryKind::Income => magnitude,
        EntryKind::Expense => -magnitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_income_keeps_sign() {
        assert_eq!(signed_amount(EntryKind::Income, dec!(100)).unwrap(), dec!(100));
        assert_eq!(
            signed_amount(EntryKind::Income, dec!(0.01)).unwrap(),
            dec!(0.01)
        );
    }

    #[test]
    fn test_expense_negates() {
        assert_eq!(
            signed_amount(EntryKind::Expense, dec!(30)).unwrap(),
            dec!(-30)
        );
        assert_eq!(
            signed_amount(EntryKind::Expense, dec!(12.50)).unwrap(),
            dec!(-12.50)
        );
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(
            signed_amount(EntryKind::Income, Decimal::ZERO),
            Err(EntryError::NonPositiveAmount(Decimal::ZERO))
        );
        assert_eq!(
            signed_amount(EntryKind::Expense, dec!(-5)),
            Err(EntryError::NonPositiveAmount(dec!(-5)))
        );
    }

    #[test]
    fn test_rejects_sub_cent_precision() {
        assert_eq!(
            signed_amount(EntryKind::Income, dec!(1.999)),
            Err(EntryError::ExcessivePrecision(dec!(1.999)))
        );
        // trailing zeros are not precision
        assert_eq!(
            signed_amount(EntryKind::Income, dec!(1.100)).unwrap(),
            dec!(1.100)
        );
    }

    #[rstest]
    #[case("income", EntryKind::Income)]
    #[case("Income", EntryKind::Income)]
    #[case("EXPENSE", EntryKind::Expense)]
    fn test_kind_parsing(#[case] input: &str, #[case] expected: EntryKind) {
        assert_eq!(input.parse::<EntryKind>().unwrap(), expected);
    }

    #[test]
    fn test_kind_parsing_rejects_unknown() {
        assert!(matches!(
            "transfer".parse::<EntryKind>(),
            Err(EntryError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_kind_display_round_trip() {
        for kind in [EntryKind::Income, EntryKind::Expense] {
            assert_eq!(kind.to_string().parse::<EntryKind>().unwrap(), kind);
        }
    }

    /// Strategy for positive amounts with at most 2 decimal places.
    fn magnitude_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, CURRENCY_SCALE))
    }

    fn balance_strategy() -> impl Strategy<Value = Decimal> {
        (-10_000_000i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, CURRENCY_SCALE))
    }

    proptest! {
        /// Income is always positive, expense always negative, and both
        /// preserve the magnitude exactly.
        #[test]
        fn prop_sign_matches_kind(magnitude in magnitude_strategy()) {
            let income = signed_amount(EntryKind::Income, magnitude).unwrap();
            let expense = signed_amount(EntryKind::Expense, magnitude).unwrap();

            prop_assert!(income > Decimal::ZERO);
            prop_assert!(expense < Decimal::ZERO);
            prop_assert_eq!(income.abs(), magnitude);
            prop_assert_eq!(expense.abs(), magnitude);
        }

        /// Recording then deleting an entry restores the balance exactly:
        /// balance + signed - signed == balance, with no rounding drift.
        #[test]
        fn prop_record_delete_round_trip(
            balance in balance_strategy(),
            magnitude in magnitude_strategy(),
            kind in prop_oneof![Just(EntryKind::Income), Just(EntryKind::Expense)],
        ) {
            let signed = signed_amount(kind, magnitude).unwrap();
            let after_record = balance + signed;
            let after_delete = after_record - signed;
            prop_assert_eq!(after_delete, balance);
        }

        /// Validation never panics for arbitrary decimals.
        #[test]
        fn prop_validation_total(mantissa in any::<i64>(), scale in 0u32..10) {
            let value = Decimal::new(mantissa, scale);
            let _ = signed_amount(EntryKind::Income, value);
            let _ = signed_amount(EntryKind::Expense, value);
        }
    }
}
