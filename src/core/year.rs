use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// UK fiscal year (runs 6 April to 5 April).
///
/// The value is the end year, so `FiscalYear(2022)` is the "2021-2022" year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FiscalYear(pub i32);

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid fiscal year '{0}', expected e.g. 2021-2022, 2021/22 or 2022")]
pub struct ParseYearError(String);

impl FiscalYear {
    /// Fiscal year containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year();
        match NaiveDate::from_ymd_opt(year, 4, 6) {
            Some(start) if date >= start => FiscalYear(year + 1),
            _ => FiscalYear(year),
        }
    }

    /// Fiscal year containing today's local date
    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    /// First day of the year (6 April of the start year)
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0 - 1, 4, 6)
    }

    /// Last day of the year (5 April of the end year)
    pub fn end_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, 4, 5)
    }

    /// Lookup key format, e.g. "2021-2022"
    pub fn key(&self) -> String {
        format!("{}-{}", self.0 - 1, self.0)
    }
}

impl FromStr for FiscalYear {
    type Err = ParseYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseYearError(s.to_string());
        let s = s.trim();

        let Some((start, end)) = s.split_once(['-', '/']) else {
            return match s.parse::<i32>() {
                Ok(year) if year > 0 => Ok(FiscalYear(year)),
                _ => Err(err()),
            };
        };
        let start: i32 = start.parse().map_err(|_| err())?;
        let next = start.checked_add(1).ok_or_else(err)?;
        let end: i32 = match end.len() {
            2 => {
                let short: i32 = end.parse().map_err(|_| err())?;
                (next / 100 * 100).checked_add(short).ok_or_else(err)?
            }
            4 => end.parse().map_err(|_| err())?,
            _ => return Err(err()),
        };
        if end != next || end < 1 {
            return Err(err());
        }
        Ok(FiscalYear(end))
    }
}

impl TryFrom<String> for FiscalYear {
    type Error = ParseYearError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FiscalYear> for String {
    fn from(year: FiscalYear) -> Self {
        year.key()
    }
}

impl std::fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
