use super::error::CalcError;
use super::ledger::EmployeeLedger;
use super::pension::PensionMode;
use super::year::FiscalYear;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;
use takehome_derive::CsvSchema;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{name}: {what} rejected")]
    Rejected { name: String, what: &'static str },
    #[error("{name}: pension contribution failed: {source}")]
    Pension { name: String, source: CalcError },
}

/// One employee's pay details (JSON)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EmployeeInput {
    /// Employee name or id
    pub name: String,
    /// Fiscal year, e.g. "2021-2022"; defaults to the year containing `as_of`
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub year: Option<FiscalYear>,
    /// Date used to choose the fiscal year when `year` is absent (defaults to today)
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    /// Income subject to tax and national insurance (salary, bonus, ...)
    #[serde(default)]
    #[schemars(with = "Vec<f64>")]
    pub taxable_income: Vec<Decimal>,
    /// Income paid without deductions
    #[serde(default)]
    #[schemars(with = "Vec<f64>")]
    pub non_taxable_income: Vec<Decimal>,
    /// Expenses taken before tax (salary sacrifice)
    #[serde(default)]
    #[schemars(with = "Vec<f64>")]
    pub pre_tax_expenses: Vec<Decimal>,
    /// Expenses taken after tax
    #[serde(default)]
    #[schemars(with = "Vec<f64>")]
    pub post_tax_expenses: Vec<Decimal>,
    /// Optional workplace pension
    #[serde(default)]
    pub pension: Option<PensionInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PensionInput {
    /// Percentage of pensionable earnings (0 - 100)
    #[schemars(with = "f64")]
    pub percentage: Decimal,
    /// Contribution made before tax
    #[serde(default)]
    pub pre_tax: bool,
    /// Contribution made after tax
    #[serde(default)]
    pub post_tax: bool,
}

impl EmployeeInput {
    pub fn read_json<R: Read>(reader: R) -> serde_json::Result<EmployeeInput> {
        serde_json::from_reader(reader)
    }

    pub fn fiscal_year(&self) -> FiscalYear {
        self.year
            .or_else(|| self.as_of.map(FiscalYear::from_date))
            .unwrap_or_else(FiscalYear::current)
    }

    /// Records incomes, then expenses, then the pension contribution for `year`.
    ///
    /// Returns the pension amount deducted, if a pension was given.
    pub fn apply(
        &self,
        ledger: &mut EmployeeLedger,
        year: FiscalYear,
    ) -> Result<Option<Decimal>, InputError> {
        let reject = |what| InputError::Rejected {
            name: self.name.clone(),
            what,
        };
        if !ledger.add_taxable_income(&self.taxable_income) {
            return Err(reject("taxable income"));
        }
        if !ledger.add_non_taxable_income(&self.non_taxable_income) {
            return Err(reject("non-taxable income"));
        }
        if !ledger.add_pre_tax_expense(&self.pre_tax_expenses) {
            return Err(reject("pre-tax expenses"));
        }
        if !ledger.add_post_tax_expense(&self.post_tax_expenses) {
            return Err(reject("post-tax expenses"));
        }

        let Some(pension) = &self.pension else {
            return Ok(None);
        };
        PensionMode::from_flags(pension.pre_tax, pension.post_tax)
            .and_then(|mode| ledger.add_pension_contribution(year, pension.percentage, mode))
            .map(Some)
            .map_err(|source| InputError::Pension {
                name: self.name.clone(),
                source,
            })
    }
}

/// Column description for CSV input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// One employee per row of a batch CSV file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, CsvSchema)]
pub struct BatchRecord {
    /// Employee name or id
    pub name: String,
    /// Fiscal year (2021-2022, 2021/22 or 2022)
    pub year: FiscalYear,
    /// Annual taxable income
    pub taxable_income: Decimal,
    /// Annual income paid without deductions
    pub non_taxable_income: Option<Decimal>,
    /// Annual expenses taken before tax
    pub pre_tax_expense: Option<Decimal>,
    /// Annual expenses taken after tax
    pub post_tax_expense: Option<Decimal>,
    /// Pension contribution as a percentage of pensionable earnings
    pub pension_pct: Option<Decimal>,
    /// pre-tax or post-tax (required with pension_pct)
    pub pension_mode: Option<String>,
}

impl BatchRecord {
    pub fn read_csv<R: Read>(reader: R) -> csv::Result<Vec<BatchRecord>> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let records = rdr.deserialize().collect::<csv::Result<Vec<BatchRecord>>>()?;
        log::info!("Read {} csv records", records.len());
        Ok(records)
    }

    pub fn to_input(&self) -> EmployeeInput {
        let mode = self
            .pension_mode
            .as_deref()
            .map(|m| m.trim().to_ascii_lowercase())
            .unwrap_or_default();
        EmployeeInput {
            name: self.name.clone(),
            year: Some(self.year),
            as_of: None,
            taxable_income: vec![self.taxable_income],
            non_taxable_income: self.non_taxable_income.into_iter().collect(),
            pre_tax_expenses: self.pre_tax_expense.into_iter().collect(),
            post_tax_expenses: self.post_tax_expense.into_iter().collect(),
            pension: self.pension_pct.map(|percentage| PensionInput {
                percentage,
                pre_tax: mode == "pre-tax" || mode == "pre",
                post_tax: mode == "post-tax" || mode == "post",
            }),
        }
    }
}
