//! Validation of candidate amounts supplied to a ledger.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// A value that may be convertible to a monetary amount.
pub trait ToAmount {
    /// The value as a decimal, or `None` if it is not a real number.
    fn to_amount(&self) -> Option<Decimal>;
}

impl ToAmount for Decimal {
    fn to_amount(&self) -> Option<Decimal> {
        Some(*self)
    }
}

impl ToAmount for f64 {
    fn to_amount(&self) -> Option<Decimal> {
        if self.is_finite() {
            Decimal::from_f64(*self)
        } else {
            None
        }
    }
}

impl ToAmount for i64 {
    fn to_amount(&self) -> Option<Decimal> {
        Some(Decimal::from(*self))
    }
}

impl ToAmount for i32 {
    fn to_amount(&self) -> Option<Decimal> {
        Some(Decimal::from(*self))
    }
}

impl ToAmount for u32 {
    fn to_amount(&self) -> Option<Decimal> {
        Some(Decimal::from(*self))
    }
}

impl ToAmount for str {
    fn to_amount(&self) -> Option<Decimal> {
        let s = self.trim();
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .ok()
    }
}

impl ToAmount for String {
    fn to_amount(&self) -> Option<Decimal> {
        self.as_str().to_amount()
    }
}

impl<T: ToAmount + ?Sized> ToAmount for &T {
    fn to_amount(&self) -> Option<Decimal> {
        (**self).to_amount()
    }
}

/// A valid amount is a real number that is not negative.
pub fn valid_amount<T: ToAmount + ?Sized>(value: &T) -> Option<Decimal> {
    value.to_amount().filter(|amount| *amount >= Decimal::ZERO)
}

/// Validates every value of a batch, returning their sum only if all are valid.
pub fn sum_valid<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator,
    I::Item: ToAmount,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| {
            valid_amount(&value).and_then(|amount| total.checked_add(amount))
        })
}

/// Rounds an amount to pence.
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn numbers_are_valid() {
        assert_eq!(valid_amount(&dec!(12.5)), Some(dec!(12.5)));
        assert_eq!(valid_amount(&27000i64), Some(dec!(27000)));
        assert_eq!(valid_amount(&0.0f64), Some(dec!(0)));
        assert_eq!(valid_amount("15000.25"), Some(dec!(15000.25)));
    }

    #[test]
    fn negative_values_are_invalid() {
        assert_eq!(valid_amount(&dec!(-0.01)), None);
        assert_eq!(valid_amount(&-4332i64), None);
        assert_eq!(valid_amount("-1"), None);
    }

    #[test]
    fn non_numbers_are_invalid() {
        assert_eq!(valid_amount("string"), None);
        assert_eq!(valid_amount(""), None);
        assert_eq!(valid_amount(&f64::NAN), None);
        assert_eq!(valid_amount(&f64::INFINITY), None);
    }

    #[test]
    fn sum_valid_adds_whole_batch() {
        assert_eq!(sum_valid(["27000", "15000"]), Some(dec!(42000)));
        assert_eq!(sum_valid(Vec::<Decimal>::new()), Some(Decimal::ZERO));
    }

    #[test]
    fn sum_valid_rejects_batch_with_one_bad_value() {
        assert_eq!(sum_valid(["123", "168", "string"]), None);
        assert_eq!(sum_valid([123i64, 168687, -4332]), None);
    }

    #[test]
    fn round_to_pence() {
        assert_eq!(round(dec!(3457.024)), dec!(3457.02));
        assert_eq!(round(dec!(5395.7788)), dec!(5395.78));
    }
}
