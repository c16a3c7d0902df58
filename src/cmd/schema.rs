//! Schema command - print expected input formats

use clap::Args;
use schemars::schema_for;
use takehome::{BatchRecord, EmployeeInput, RateTable};

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format
    #[arg(value_enum, default_value = "employee")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the employee input file
    Employee,
    /// JSON Schema for the rate table file
    Rates,
    /// CSV header row for batch files
    CsvHeader,
    /// CSV column descriptions for batch files
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::Employee => {
                let schema = schema_for!(EmployeeInput);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::Rates => {
                let schema = schema_for!(RateTable);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::CsvHeader => println!("{}", BatchRecord::csv_header()),
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
        Ok(())
    }

    fn print_csv_fields(&self) {
        println!("Batch CSV Format");
        println!("================");
        println!();
        for field in BatchRecord::csv_schema() {
            let req = if field.required { "required" } else { "optional" };
            println!("{:20} ({:8})  {}", field.name, req, field.description);
        }
        println!();
        println!("Amounts are annual and in pounds; pension_mode is pre-tax or post-tax");
    }
}
