//! Calc command - take-home pay for a single employee

use super::{format_gbp, format_pct, open_input};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};
use takehome::{
    band_slices, EmployeeInput, EmployeeLedger, FiscalYear, LevyKind, PensionMode, RateProvider,
    RateTable, TakeHomeSummary,
};

#[derive(Args, Debug)]
pub struct CalcCommand {
    /// JSON file describing the employee ("-" for stdin)
    #[arg(short, long, conflicts_with_all = ["taxable", "non_taxable", "pre_tax_expense", "post_tax_expense", "pension"])]
    input: Option<PathBuf>,

    /// Employee name or id
    #[arg(short, long, default_value = "employee")]
    name: String,

    /// Fiscal year (e.g. 2021-2022); defaults to the year containing today
    #[arg(short, long)]
    year: Option<FiscalYear>,

    /// Taxable income, repeat for several sources
    #[arg(short, long)]
    taxable: Vec<String>,

    /// Income paid without deductions, repeat for several sources
    #[arg(long)]
    non_taxable: Vec<String>,

    /// Expense taken before tax, repeatable
    #[arg(long)]
    pre_tax_expense: Vec<String>,

    /// Expense taken after tax, repeatable
    #[arg(long)]
    post_tax_expense: Vec<String>,

    /// Pension contribution as a percentage of pensionable earnings
    #[arg(short, long)]
    pension: Option<Decimal>,

    /// Pension is paid before tax (salary sacrifice)
    #[arg(long, requires = "pension")]
    pre_tax: bool,

    /// Pension is paid after tax (relief at source)
    #[arg(long, requires = "pension")]
    post_tax: bool,

    /// Show how income falls into each band
    #[arg(long)]
    bands: bool,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// Summary data for JSON output
#[derive(Debug, Serialize)]
struct SummaryData {
    name: String,
    fiscal_year: String,
    gross_income: String,
    income_tax: String,
    national_insurance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pension_contribution: Option<String>,
    pre_tax_expenses: String,
    post_tax_expenses: String,
    total_deductions: String,
    net_income: String,
    net_monthly: String,
    net_weekly: String,
}

impl SummaryData {
    fn new(summary: &TakeHomeSummary, pension: Option<Decimal>) -> Self {
        SummaryData {
            name: summary.name.clone(),
            fiscal_year: summary.year.key(),
            gross_income: format!("{:.2}", summary.gross_income),
            income_tax: format!("{:.2}", summary.income_tax),
            national_insurance: format!("{:.2}", summary.social_insurance),
            pension_contribution: pension.map(|p| format!("{:.2}", p)),
            pre_tax_expenses: format!("{:.2}", summary.pre_tax_expense),
            post_tax_expenses: format!("{:.2}", summary.post_tax_expense),
            total_deductions: format!("{:.2}", summary.deductions),
            net_income: format!("{:.2}", summary.net_income),
            net_monthly: format!("{:.2}", summary.net_monthly),
            net_weekly: format!("{:.2}", summary.net_weekly),
        }
    }
}

#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Debug, Clone, Tabled)]
struct BandRow {
    #[tabled(rename = "Levy")]
    levy: String,
    #[tabled(rename = "Above")]
    threshold: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Income in band")]
    slice: String,
    #[tabled(rename = "Charge")]
    charge: String,
}

impl CalcCommand {
    pub fn exec(&self, rates: &RateTable) -> anyhow::Result<()> {
        let (ledger, year, pension) = match &self.input {
            Some(path) => {
                let input = EmployeeInput::read_json(open_input(path)?)?;
                let year = self.year.unwrap_or_else(|| input.fiscal_year());
                let mut ledger = EmployeeLedger::new(&input.name, rates);
                let pension = input.apply(&mut ledger, year)?;
                (ledger, year, pension)
            }
            None => {
                let year = self.year.unwrap_or_else(FiscalYear::current);
                self.ledger_from_args(rates, year)
                    .map(|(ledger, pension)| (ledger, year, pension))?
            }
        };

        let summary = ledger.summary(year)?;
        log::info!("{}: net income {} for {}", summary.name, summary.net_income, year);

        if self.json {
            let data = SummaryData::new(&summary, pension);
            println!("{}", serde_json::to_string_pretty(&data)?);
            return Ok(());
        }

        self.print_summary(&summary, pension);
        if self.bands {
            let base = ledger.levy_base()?;
            print_bands(rates, year, base);
        }
        Ok(())
    }

    fn ledger_from_args<'r>(
        &self,
        rates: &'r RateTable,
        year: FiscalYear,
    ) -> anyhow::Result<(EmployeeLedger<'r>, Option<Decimal>)> {
        let mut ledger = EmployeeLedger::new(&self.name, rates);
        if !ledger.add_taxable_income(&self.taxable) {
            anyhow::bail!("Taxable income must be non-negative numbers: {:?}", self.taxable);
        }
        if !ledger.add_non_taxable_income(&self.non_taxable) {
            anyhow::bail!(
                "Non-taxable income must be non-negative numbers: {:?}",
                self.non_taxable
            );
        }
        if !ledger.add_pre_tax_expense(&self.pre_tax_expense) {
            anyhow::bail!(
                "Pre-tax expenses must be non-negative numbers below taxable income: {:?}",
                self.pre_tax_expense
            );
        }
        if !ledger.add_post_tax_expense(&self.post_tax_expense) {
            anyhow::bail!(
                "Post-tax expenses must be non-negative numbers: {:?}",
                self.post_tax_expense
            );
        }

        let pension = match self.pension {
            Some(pct) => {
                let mode = PensionMode::from_flags(self.pre_tax, self.post_tax)?;
                Some(ledger.add_pension_contribution(year, pct, mode)?)
            }
            None => None,
        };
        Ok((ledger, pension))
    }

    fn print_summary(&self, summary: &TakeHomeSummary, pension: Option<Decimal>) {
        let row = |item: &str, amount: Decimal| SummaryRow {
            item: item.to_string(),
            amount: format_gbp(amount),
        };

        let mut rows = vec![
            row("Gross income", summary.gross_income),
            row("Income tax", summary.income_tax),
            row("National insurance", summary.social_insurance),
        ];
        if let Some(pension) = pension {
            rows.push(row("Pension contribution", pension));
        }
        rows.extend([
            row("Pre-tax expenses", summary.pre_tax_expense),
            row("Post-tax expenses", summary.post_tax_expense),
            row("Total deductions", summary.deductions),
            row("Net income", summary.net_income),
            row("  per month", summary.net_monthly),
            row("  per week", summary.net_weekly),
        ]);

        println!();
        println!("TAKE-HOME PAY ({}, {})", summary.name, summary.year);
        println!();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }
}

fn print_bands(rates: &RateTable, year: FiscalYear, base: Decimal) {
    let rows: Vec<BandRow> = LevyKind::ALL
        .into_iter()
        .filter_map(|kind| rates.levy_bands(year, kind).map(|bands| (kind, bands)))
        .flat_map(|(kind, bands)| {
            band_slices(base, bands)
                .into_iter()
                .map(move |(band, slice)| BandRow {
                    levy: kind.to_string(),
                    threshold: format_gbp(band.threshold),
                    rate: format_pct(band.rate_pct),
                    slice: format_gbp(slice),
                    charge: format_gbp(slice * band.rate_pct / Decimal::ONE_HUNDRED),
                })
        })
        .collect();

    println!();
    println!("BANDS (on {})", format_gbp(base));
    println!();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}
