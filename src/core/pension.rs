use super::error::{CalcError, CalcResult};
use super::rates::PensionBand;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Approximate value of a post-tax contribution once basic-rate relief is reclaimed.
pub const POST_TAX_RELIEF: Decimal = dec!(0.8);

/// Whether a pension contribution comes out of pay before or after tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PensionMode {
    /// Salary sacrifice: reduces taxable income
    PreTax,
    /// Relief at source: deducted from net pay
    PostTax,
}

impl PensionMode {
    /// Exactly one of the two flags must be set.
    pub fn from_flags(pre_tax: bool, post_tax: bool) -> CalcResult<PensionMode> {
        match (pre_tax, post_tax) {
            (true, false) => Ok(PensionMode::PreTax),
            (false, true) => Ok(PensionMode::PostTax),
            _ => Err(CalcError::InvalidMode),
        }
    }
}

impl std::fmt::Display for PensionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PensionMode::PreTax => write!(f, "pre-tax"),
            PensionMode::PostTax => write!(f, "post-tax"),
        }
    }
}

/// Contribution percentage, guaranteed to lie within 0 - 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percentage(Decimal);

impl Percentage {
    pub fn new(pct: Decimal) -> CalcResult<Percentage> {
        if pct < Decimal::ZERO || pct > dec!(100) {
            return Err(CalcError::InvalidPercentage);
        }
        Ok(Percentage(pct))
    }

    /// `None` if the product overflows.
    pub fn of(&self, amount: Decimal) -> Option<Decimal> {
        Some(amount.checked_mul(self.0)? / dec!(100))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// Taxable income inside the pension band.
pub fn pensionable_earnings(taxable_income: Decimal, band: PensionBand) -> Decimal {
    let width = (band.upper - band.lower).max(Decimal::ZERO);
    (taxable_income - band.lower).clamp(Decimal::ZERO, width)
}

/// Amount deducted from pay for a contribution of `pct` in the given mode.
pub fn contribution(
    taxable_income: Decimal,
    band: PensionBand,
    pct: Percentage,
    mode: PensionMode,
) -> Option<Decimal> {
    let raw = pct.of(pensionable_earnings(taxable_income, band))?;
    match mode {
        PensionMode::PreTax => Some(raw),
        PensionMode::PostTax => raw.checked_mul(POST_TAX_RELIEF),
    }
}
