//! Take-home pay for UK salaried employees.
//!
//! An [`EmployeeLedger`] accumulates taxable and non-taxable income, pre-tax and
//! post-tax expenses, and pension contributions. Income tax and national
//! insurance are charged on marginal bands looked up per fiscal year through a
//! [`RateProvider`]; [`RateTable::builtin`] covers 2018-2019 to 2021-2022.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use takehome::{EmployeeLedger, FiscalYear, PensionMode, RateTable};
//!
//! let year: FiscalYear = "2021-2022".parse().unwrap();
//! let mut ledger = EmployeeLedger::new("alice", RateTable::builtin());
//! assert!(ledger.add_taxable_income([dec!(24000)]));
//! ledger.add_pension_contribution(year, dec!(5), PensionMode::PostTax).unwrap();
//! assert_eq!(ledger.net_income(year), Ok(dec!(19273.56)));
//! ```

pub mod core;

pub use crate::core::*;
