use super::year::FiscalYear;
use rust_decimal::Decimal;

/// Reasons a ledger computation can fail.
///
/// The `Display` text is the human-readable reason surfaced to callers.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CalcError {
    #[error("Value not valid")]
    InvalidAmount,
    #[error("Taxable income invalid")]
    InvalidIncome,
    #[error("{} tax expenses invalid", .0.label())]
    InvalidExpense(ExpenseKind),
    #[error("Year not valid: {0}")]
    YearNotFound(FiscalYear),
    #[error("Percentage must be within 0 - 100 range")]
    InvalidPercentage,
    #[error("Pension must be either pre OR post tax")]
    InvalidMode,
    #[error("Pre tax expense of {expense} would not leave taxable income of {income}")]
    InvalidState { expense: Decimal, income: Decimal },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseKind {
    PreTax,
    PostTax,
}

impl ExpenseKind {
    fn label(&self) -> &'static str {
        match self {
            ExpenseKind::PreTax => "Pre",
            ExpenseKind::PostTax => "Post",
        }
    }
}

/// Outcome of every derived-value computation on a ledger.
pub type CalcResult<T = Decimal> = Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(CalcError::InvalidAmount.to_string(), "Value not valid");
        assert_eq!(CalcError::InvalidIncome.to_string(), "Taxable income invalid");
        assert_eq!(
            CalcError::InvalidMode.to_string(),
            "Pension must be either pre OR post tax"
        );
        assert_eq!(
            CalcError::InvalidPercentage.to_string(),
            "Percentage must be within 0 - 100 range"
        );
    }

    #[test]
    fn expense_message_names_the_kind() {
        assert_eq!(
            CalcError::InvalidExpense(ExpenseKind::PreTax).to_string(),
            "Pre tax expenses invalid"
        );
        assert_eq!(
            CalcError::InvalidExpense(ExpenseKind::PostTax).to_string(),
            "Post tax expenses invalid"
        );
    }

    #[test]
    fn year_not_found_shows_key() {
        let err = CalcError::YearNotFound(FiscalYear(2031));
        assert_eq!(err.to_string(), "Year not valid: 2030-2031");
    }

    #[test]
    fn invalid_state_shows_amounts() {
        let err = CalcError::InvalidState {
            expense: dec!(900),
            income: dec!(800),
        };
        assert_eq!(
            err.to_string(),
            "Pre tax expense of 900 would not leave taxable income of 800"
        );
    }
}
