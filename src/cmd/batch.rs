//! Batch command - take-home pay for every employee in a CSV file

use super::{format_gbp, open_input};
use clap::Args;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use takehome::{BatchRecord, EmployeeLedger, RateTable, TakeHomeSummary};

#[derive(Args, Debug)]
pub struct BatchCommand {
    /// CSV file with one employee per row ("-" for stdin)
    #[arg(short, long)]
    file: PathBuf,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

/// Row for the batch table output
#[derive(Debug, Clone, Tabled, serde::Serialize)]
pub struct BatchRow {
    #[tabled(rename = "Name")]
    pub name: String,

    #[tabled(rename = "Year")]
    pub year: String,

    #[tabled(rename = "Gross")]
    pub gross_income: String,

    #[tabled(rename = "Income Tax")]
    pub income_tax: String,

    #[tabled(rename = "NI")]
    pub national_insurance: String,

    #[tabled(rename = "Deductions")]
    pub deductions: String,

    #[tabled(rename = "Net")]
    pub net_income: String,

    #[tabled(rename = "Monthly")]
    pub net_monthly: String,

    #[tabled(rename = "Error")]
    pub error: String,
}

impl BatchCommand {
    pub fn exec(&self, rates: &RateTable) -> anyhow::Result<()> {
        let records = BatchRecord::read_csv(open_input(&self.file)?)?;
        let rows: Vec<BatchRow> = records.iter().map(|r| calculate(r, rates)).collect();

        let failures = rows.iter().filter(|r| !r.error.is_empty()).count();
        if failures > 0 {
            log::warn!("{} of {} employee(s) could not be calculated", failures, rows.len());
        }

        if self.csv {
            self.write_csv(&rows)
        } else {
            self.print_table(&rows);
            Ok(())
        }
    }

    fn print_table(&self, rows: &[BatchRow]) {
        if rows.is_empty() {
            println!("No employees found");
            return;
        }

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }

    fn write_csv(&self, rows: &[BatchRow]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Each record gets its own ledger; failures are reported in the row.
fn calculate(record: &BatchRecord, rates: &RateTable) -> BatchRow {
    let input = record.to_input();
    let mut ledger = EmployeeLedger::new(&record.name, rates);
    let result = input
        .apply(&mut ledger, record.year)
        .map_err(|e| e.to_string())
        .and_then(|_| ledger.summary(record.year).map_err(|e| e.to_string()));

    match result {
        Ok(summary) => summary_row(&summary),
        Err(error) => {
            log::warn!("{}: {}", record.name, error);
            BatchRow {
                name: record.name.clone(),
                year: record.year.key(),
                gross_income: String::new(),
                income_tax: String::new(),
                national_insurance: String::new(),
                deductions: String::new(),
                net_income: String::new(),
                net_monthly: String::new(),
                error,
            }
        }
    }
}

fn summary_row(summary: &TakeHomeSummary) -> BatchRow {
    BatchRow {
        name: summary.name.clone(),
        year: summary.year.key(),
        gross_income: format_gbp(summary.gross_income),
        income_tax: format_gbp(summary.income_tax),
        national_insurance: format_gbp(summary.social_insurance),
        deductions: format_gbp(summary.deductions),
        net_income: format_gbp(summary.net_income),
        net_monthly: format_gbp(summary.net_monthly),
        error: String::new(),
    }
}
