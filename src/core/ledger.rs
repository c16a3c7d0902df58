use super::amount::{round, sum_valid, valid_amount, ToAmount};
use super::error::{CalcError, CalcResult, ExpenseKind};
use super::levy::levy;
use super::pension::{contribution, PensionMode, Percentage};
use super::rates::{LevyKind, RateProvider};
use super::year::FiscalYear;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Running income and expense totals for one employee.
///
/// Totals only change through the `add_*` and `reset_*` methods. Every batch
/// is validated before anything is applied, so a rejected batch leaves the
/// ledger untouched.
pub struct EmployeeLedger<'r> {
    name: String,
    rates: &'r dyn RateProvider,
    taxable_income: Decimal,
    non_taxable_income: Decimal,
    pre_tax_expense: Decimal,
    post_tax_expense: Decimal,
}

impl<'r> EmployeeLedger<'r> {
    pub fn new(name: impl Into<String>, rates: &'r dyn RateProvider) -> Self {
        EmployeeLedger {
            name: name.into(),
            rates,
            taxable_income: Decimal::ZERO,
            non_taxable_income: Decimal::ZERO,
            pre_tax_expense: Decimal::ZERO,
            post_tax_expense: Decimal::ZERO,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn taxable_income(&self) -> Decimal {
        self.taxable_income
    }

    pub fn non_taxable_income(&self) -> Decimal {
        self.non_taxable_income
    }

    pub fn pre_tax_expense(&self) -> Decimal {
        self.pre_tax_expense
    }

    pub fn post_tax_expense(&self) -> Decimal {
        self.post_tax_expense
    }

    pub fn reset_taxable_income(&mut self) {
        self.taxable_income = Decimal::ZERO;
    }

    pub fn reset_non_taxable_income(&mut self) {
        self.non_taxable_income = Decimal::ZERO;
    }

    pub fn reset_pre_tax_expense(&mut self) {
        self.pre_tax_expense = Decimal::ZERO;
    }

    pub fn reset_post_tax_expense(&mut self) {
        self.post_tax_expense = Decimal::ZERO;
    }

    /// Adds income subject to income tax and national insurance.
    pub fn add_taxable_income<I>(&mut self, values: I) -> bool
    where
        I: IntoIterator,
        I::Item: ToAmount,
    {
        accumulate(&mut self.taxable_income, values, "taxable income")
    }

    /// Adds income that is paid without deductions.
    pub fn add_non_taxable_income<I>(&mut self, values: I) -> bool
    where
        I: IntoIterator,
        I::Item: ToAmount,
    {
        accumulate(&mut self.non_taxable_income, values, "non-taxable income")
    }

    /// Adds expenses taken from pay before tax (salary sacrifice).
    ///
    /// Rejected if the new total would reach the taxable income.
    pub fn add_pre_tax_expense<I>(&mut self, values: I) -> bool
    where
        I: IntoIterator,
        I::Item: ToAmount,
    {
        let total = sum_valid(values).and_then(|batch| self.pre_tax_expense.checked_add(batch));
        let Some(total) = total else {
            log::warn!("{}: rejected invalid pre-tax expense batch", self.name);
            return false;
        };
        if total >= self.taxable_income {
            log::warn!(
                "{}: pre-tax expense {} would not leave taxable income of {}",
                self.name,
                total,
                self.taxable_income
            );
            return false;
        }
        log::debug!("{}: pre-tax expense now {}", self.name, total);
        self.pre_tax_expense = total;
        true
    }

    /// Adds expenses taken from pay after tax.
    pub fn add_post_tax_expense<I>(&mut self, values: I) -> bool
    where
        I: IntoIterator,
        I::Item: ToAmount,
    {
        accumulate(&mut self.post_tax_expense, values, "post-tax expense")
    }

    /// Taxable plus non-taxable income.
    pub fn gross_income(&self) -> CalcResult {
        let taxable = valid_amount(&self.taxable_income).ok_or(CalcError::InvalidAmount)?;
        let non_taxable = valid_amount(&self.non_taxable_income).ok_or(CalcError::InvalidAmount)?;
        let gross = taxable
            .checked_add(non_taxable)
            .ok_or(CalcError::InvalidAmount)?;
        Ok(round(gross))
    }

    /// Income the levies are charged on: taxable income less pre-tax expenses.
    ///
    /// Taxable income must exceed pre-tax expenses, so an empty ledger fails.
    pub fn levy_base(&self) -> CalcResult {
        match (
            valid_amount(&self.taxable_income),
            valid_amount(&self.pre_tax_expense),
        ) {
            (Some(income), Some(expense)) if income > expense => Ok(income - expense),
            _ => Err(CalcError::InvalidIncome),
        }
    }

    pub fn levy_paid(&self, year: FiscalYear, kind: LevyKind) -> CalcResult {
        let base = self.levy_base()?;
        let bands = self
            .rates
            .levy_bands(year, kind)
            .ok_or(CalcError::YearNotFound(year))?;
        let paid = levy(base, bands).ok_or(CalcError::InvalidIncome)?;
        log::debug!("{}: {} {} on {} = {}", self.name, year, kind, base, paid);
        Ok(paid)
    }

    /// PAYE income tax due for the year.
    pub fn income_tax_paid(&self, year: FiscalYear) -> CalcResult {
        self.levy_paid(year, LevyKind::IncomeTax)
    }

    /// National insurance due for the year.
    pub fn social_insurance_paid(&self, year: FiscalYear) -> CalcResult {
        self.levy_paid(year, LevyKind::SocialInsurance)
    }

    /// Adds a pension contribution of `pct` percent of pensionable earnings,
    /// returning the amount deducted from pay.
    ///
    /// Post-tax contributions are reduced by [`POST_TAX_RELIEF`](super::pension::POST_TAX_RELIEF)
    /// and added to post-tax expenses; pre-tax contributions are added to pre-tax
    /// expenses and fail with `InvalidState` if that would use up taxable income.
    pub fn add_pension_contribution(
        &mut self,
        year: FiscalYear,
        pct: Decimal,
        mode: PensionMode,
    ) -> CalcResult {
        let pct = Percentage::new(pct)?;
        let band = self
            .rates
            .pension_band(year)
            .ok_or(CalcError::YearNotFound(year))?;
        let income = valid_amount(&self.taxable_income).ok_or(CalcError::InvalidIncome)?;

        let pension = contribution(income, band, pct, mode).ok_or(CalcError::InvalidIncome)?;
        log::debug!(
            "{}: {}% {} pension on {} = {}",
            self.name,
            pct.value(),
            mode,
            income,
            pension
        );

        let applied = match mode {
            PensionMode::PreTax => self.add_pre_tax_expense([pension]),
            PensionMode::PostTax => self.add_post_tax_expense([pension]),
        };
        if applied {
            return Ok(round(pension));
        }
        Err(match mode {
            PensionMode::PreTax => CalcError::InvalidState {
                expense: self.pre_tax_expense.saturating_add(pension),
                income,
            },
            PensionMode::PostTax => CalcError::InvalidExpense(ExpenseKind::PostTax),
        })
    }

    /// Income tax, national insurance and all expenses.
    pub fn total_deductions(&self, year: FiscalYear) -> CalcResult {
        let income_tax = self.income_tax_paid(year)?;
        let social_insurance = self.social_insurance_paid(year)?;
        let post_tax = valid_amount(&self.post_tax_expense)
            .ok_or(CalcError::InvalidExpense(ExpenseKind::PostTax))?;
        let pre_tax = valid_amount(&self.pre_tax_expense)
            .ok_or(CalcError::InvalidExpense(ExpenseKind::PreTax))?;
        let total = [social_insurance, post_tax, pre_tax]
            .into_iter()
            .try_fold(income_tax, Decimal::checked_add)
            .ok_or(CalcError::InvalidAmount)?;
        Ok(round(total))
    }

    /// Annual take-home pay: gross income less deductions.
    pub fn net_income(&self, year: FiscalYear) -> CalcResult {
        let gross = self.gross_income()?;
        let deductions = self.total_deductions(year)?;
        Ok(round(gross - deductions))
    }

    /// Full breakdown of take-home pay for the year.
    pub fn summary(&self, year: FiscalYear) -> CalcResult<TakeHomeSummary> {
        let gross_income = self.gross_income()?;
        let deductions = self.total_deductions(year)?;
        let net_income = round(gross_income - deductions);
        Ok(TakeHomeSummary {
            name: self.name.clone(),
            year,
            gross_income,
            income_tax: self.income_tax_paid(year)?,
            social_insurance: self.social_insurance_paid(year)?,
            pre_tax_expense: round(self.pre_tax_expense),
            post_tax_expense: round(self.post_tax_expense),
            deductions,
            net_income,
            net_monthly: round(net_income / dec!(12)),
            net_weekly: round(net_income / dec!(52)),
        })
    }
}

fn accumulate<I>(total: &mut Decimal, values: I, what: &str) -> bool
where
    I: IntoIterator,
    I::Item: ToAmount,
{
    match sum_valid(values) {
        Some(batch) => {
            let Some(sum) = total.checked_add(batch) else {
                log::warn!("rejected {} batch: total overflows", what);
                return false;
            };
            *total = sum;
            log::debug!("{} now {}", what, total);
            true
        }
        None => {
            log::warn!("rejected invalid {} batch", what);
            false
        }
    }
}

/// Take-home pay breakdown for one employee and fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TakeHomeSummary {
    pub name: String,
    pub year: FiscalYear,
    pub gross_income: Decimal,
    pub income_tax: Decimal,
    pub social_insurance: Decimal,
    pub pre_tax_expense: Decimal,
    pub post_tax_expense: Decimal,
    pub deductions: Decimal,
    pub net_income: Decimal,
    pub net_monthly: Decimal,
    pub net_weekly: Decimal,
}
