pub mod batch;
pub mod calc;
pub mod rates;
pub mod schema;

use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use takehome::RateTable;

/// Open an input file, or stdin with "-"
pub fn open_input(path: &Path) -> anyhow::Result<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        let mut buffer = Vec::new();
        io::stdin().lock().read_to_end(&mut buffer)?;
        if buffer.is_empty() {
            anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
        }
        Ok(Box::new(io::Cursor::new(buffer)))
    } else {
        let file = File::open(path)
            .map_err(|e| anyhow::anyhow!("failed to open {}: {}", path.display(), e))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Built-in rates, with the years of an optional JSON rate file merged over them
pub fn load_rates(path: Option<&Path>) -> anyhow::Result<RateTable> {
    let builtin = RateTable::builtin().clone();
    match path {
        Some(path) => {
            let custom = RateTable::from_json(open_input(path)?)?;
            Ok(builtin.merge(custom))
        }
        None => Ok(builtin),
    }
}

fn format_gbp(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-£{:.2}", amount.abs())
    } else {
        format!("£{:.2}", amount)
    }
}

fn format_pct(pct: Decimal) -> String {
    format!("{}%", pct.normalize())
}
