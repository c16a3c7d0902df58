pub mod amount;
pub mod error;
pub mod input;
pub mod ledger;
pub mod levy;
pub mod pension;
pub mod rates;
pub mod year;

// Flat public surface for domain types and functions.
pub use amount::ToAmount;
pub use error::{CalcError, CalcResult, ExpenseKind};
pub use input::{BatchRecord, CsvField, EmployeeInput, InputError, PensionInput};
pub use ledger::{EmployeeLedger, TakeHomeSummary};
pub use levy::{band_slices, levy};
pub use pension::{PensionMode, Percentage, POST_TAX_RELIEF};
pub use rates::{LevyKind, PensionBand, RateBand, RateProvider, RateTable, RatesError, YearRates};
pub use year::{FiscalYear, ParseYearError};
