//! Rates command - show the bands in force for each fiscal year

use super::{format_gbp, format_pct};
use clap::Args;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use takehome::{FiscalYear, LevyKind, RateTable};

#[derive(Args, Debug)]
pub struct RatesCommand {
    /// Fiscal year to show (e.g. 2021-2022); all years if omitted
    #[arg(short, long)]
    year: Option<FiscalYear>,

    /// Output as JSON in the rate file format
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Tabled)]
struct RateRow {
    #[tabled(rename = "Year")]
    year: String,
    #[tabled(rename = "Levy")]
    levy: String,
    #[tabled(rename = "Above")]
    threshold: String,
    #[tabled(rename = "Rate")]
    rate: String,
}

impl RatesCommand {
    pub fn exec(&self, rates: &RateTable) -> anyhow::Result<()> {
        let selected = RateTable {
            years: rates
                .years
                .iter()
                .filter(|(year, _)| self.year.map_or(true, |y| **year == y))
                .map(|(year, r)| (*year, r.clone()))
                .collect(),
        };
        if let Some(year) = self.year {
            if selected.years.is_empty() {
                anyhow::bail!("No rates for fiscal year {}", year);
            }
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&selected)?);
        } else {
            self.print_table(&selected);
        }
        Ok(())
    }

    fn print_table(&self, rates: &RateTable) {
        let mut rows = Vec::new();
        for (year, year_rates) in rates.years.iter().rev() {
            for kind in LevyKind::ALL {
                rows.extend(year_rates.bands(kind).iter().map(|band| RateRow {
                    year: year.key(),
                    levy: kind.to_string(),
                    threshold: format_gbp(band.threshold),
                    rate: format_pct(band.rate_pct),
                }));
            }
            rows.push(RateRow {
                year: year.key(),
                levy: "pension band".to_string(),
                threshold: format!(
                    "{} - {}",
                    format_gbp(year_rates.pension.lower),
                    format_gbp(year_rates.pension.upper)
                ),
                rate: String::new(),
            });
        }

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }
}
