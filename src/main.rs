mod cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "takehome", version, about = "UK take-home pay calculator")]
struct Cli {
    /// JSON rate table whose fiscal years are merged over the built-in ones
    #[arg(long, global = true)]
    rates: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate take-home pay for one employee
    Calc(cmd::calc::CalcCommand),
    /// Calculate take-home pay for every employee in a CSV file
    Batch(cmd::batch::BatchCommand),
    /// Show income tax, national insurance and pension bands
    Rates(cmd::rates::RatesCommand),
    /// Print expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let rates = cmd::load_rates(cli.rates.as_deref())?;

    match cli.command {
        Command::Calc(calc) => calc.exec(&rates),
        Command::Batch(batch) => batch.exec(&rates),
        Command::Rates(r) => r.exec(&rates),
        Command::Schema(schema) => schema.exec(),
    }
}
