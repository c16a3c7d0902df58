use super::year::FiscalYear;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::LazyLock;

/// The two progressive levies deducted from taxable income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevyKind {
    /// PAYE income tax
    IncomeTax,
    /// National Insurance contributions
    SocialInsurance,
}

impl LevyKind {
    pub const ALL: [LevyKind; 2] = [LevyKind::IncomeTax, LevyKind::SocialInsurance];
}

impl std::fmt::Display for LevyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevyKind::IncomeTax => write!(f, "income tax"),
            LevyKind::SocialInsurance => write!(f, "national insurance"),
        }
    }
}

/// A marginal band: income above `threshold` (up to the next band's threshold)
/// is charged at `rate_pct` percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RateBand {
    #[schemars(with = "f64")]
    pub threshold: Decimal,
    #[schemars(with = "f64")]
    pub rate_pct: Decimal,
}

impl RateBand {
    pub const fn new(threshold: Decimal, rate_pct: Decimal) -> Self {
        RateBand {
            threshold,
            rate_pct,
        }
    }
}

/// Slice of income eligible for pension contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PensionBand {
    #[schemars(with = "f64")]
    pub lower: Decimal,
    #[schemars(with = "f64")]
    pub upper: Decimal,
}

/// All bands in force for one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct YearRates {
    pub income_tax: Vec<RateBand>,
    pub social_insurance: Vec<RateBand>,
    pub pension: PensionBand,
}

impl YearRates {
    pub fn bands(&self, kind: LevyKind) -> &[RateBand] {
        match kind {
            LevyKind::IncomeTax => &self.income_tax,
            LevyKind::SocialInsurance => &self.social_insurance,
        }
    }

    fn validate(&self, year: FiscalYear) -> Result<(), RatesError> {
        for kind in LevyKind::ALL {
            let bands = self.bands(kind);
            if bands.is_empty() {
                return Err(RatesError::EmptyBands { year, kind });
            }
            for band in bands {
                if band.threshold < Decimal::ZERO {
                    return Err(RatesError::NegativeAmount { year });
                }
                if band.rate_pct < Decimal::ZERO || band.rate_pct > dec!(100) {
                    return Err(RatesError::RateOutOfRange {
                        year,
                        kind,
                        rate: band.rate_pct,
                    });
                }
            }
            if bands.windows(2).any(|w| w[0].threshold >= w[1].threshold) {
                return Err(RatesError::UnsortedBands { year, kind });
            }
        }
        let PensionBand { lower, upper } = self.pension;
        if lower < Decimal::ZERO {
            return Err(RatesError::NegativeAmount { year });
        }
        if lower > upper {
            return Err(RatesError::InvertedPensionBand { year, lower, upper });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RatesError {
    #[error("{year}: no {kind} bands")]
    EmptyBands { year: FiscalYear, kind: LevyKind },
    #[error("{year}: {kind} thresholds must be strictly increasing")]
    UnsortedBands { year: FiscalYear, kind: LevyKind },
    #[error("{year}: {kind} rate {rate}% outside 0 - 100")]
    RateOutOfRange {
        year: FiscalYear,
        kind: LevyKind,
        rate: Decimal,
    },
    #[error("{year}: thresholds must not be negative")]
    NegativeAmount { year: FiscalYear },
    #[error("{year}: pension lower band {lower} is above upper band {upper}")]
    InvertedPensionBand {
        year: FiscalYear,
        lower: Decimal,
        upper: Decimal,
    },
    #[error("failed to parse rate table: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Supplies the bands for a fiscal year.
pub trait RateProvider {
    /// Ordered marginal bands of a levy, or `None` if the year is unknown.
    fn levy_bands(&self, year: FiscalYear, kind: LevyKind) -> Option<&[RateBand]>;
    /// Pensionable earnings band, or `None` if the year is unknown.
    fn pension_band(&self, year: FiscalYear) -> Option<PensionBand>;
}

/// Rate table input root (JSON), keyed by fiscal year e.g. "2021-2022"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RateTable {
    #[schemars(with = "BTreeMap<String, YearRates>")]
    pub years: BTreeMap<FiscalYear, YearRates>,
}

static BUILTIN: LazyLock<RateTable> = LazyLock::new(builtin_table);

impl RateTable {
    /// Rates shipped with the crate, built once per process.
    pub fn builtin() -> &'static RateTable {
        &BUILTIN
    }

    /// Reads and validates a rate table from JSON.
    pub fn from_json<R: Read>(reader: R) -> Result<RateTable, RatesError> {
        let table: RateTable = serde_json::from_reader(reader)?;
        table.validate()?;
        log::info!("Loaded rates for {} fiscal year(s)", table.years.len());
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), RatesError> {
        self.years
            .iter()
            .try_for_each(|(year, rates)| rates.validate(*year))
    }

    /// Returns this table with `other`'s years added, replacing any already present.
    pub fn merge(mut self, other: RateTable) -> RateTable {
        for (year, rates) in other.years {
            if self.years.insert(year, rates).is_some() {
                log::debug!("Rates for {} overridden", year);
            }
        }
        self
    }

    pub fn years(&self) -> impl Iterator<Item = FiscalYear> + '_ {
        self.years.keys().copied()
    }

    pub fn get(&self, year: FiscalYear) -> Option<&YearRates> {
        self.years.get(&year)
    }
}

impl RateProvider for RateTable {
    fn levy_bands(&self, year: FiscalYear, kind: LevyKind) -> Option<&[RateBand]> {
        self.get(year).map(|rates| rates.bands(kind))
    }

    fn pension_band(&self, year: FiscalYear) -> Option<PensionBand> {
        self.get(year).map(|rates| rates.pension)
    }
}

fn year_rates(
    income_tax: [(Decimal, Decimal); 3],
    social_insurance: [(Decimal, Decimal); 2],
    pension: (Decimal, Decimal),
) -> YearRates {
    let bands = |bands: &[(Decimal, Decimal)]| {
        bands
            .iter()
            .map(|&(threshold, rate)| RateBand::new(threshold, rate))
            .collect()
    };
    YearRates {
        income_tax: bands(&income_tax),
        social_insurance: bands(&social_insurance),
        pension: PensionBand {
            lower: pension.0,
            upper: pension.1,
        },
    }
}

fn builtin_table() -> RateTable {
    let years = BTreeMap::from([
        (
            FiscalYear(2022),
            year_rates(
                [
                    (dec!(12579), dec!(20)),
                    (dec!(50279), dec!(40)),
                    (dec!(150000), dec!(45)),
                ],
                [(dec!(9568), dec!(12)), (dec!(50270), dec!(2))],
                (dec!(6240), dec!(50270)),
            ),
        ),
        (
            FiscalYear(2021),
            year_rates(
                [
                    (dec!(12500), dec!(20)),
                    (dec!(50000), dec!(40)),
                    (dec!(150000), dec!(45)),
                ],
                [(dec!(9500), dec!(12)), (dec!(50000), dec!(2))],
                (dec!(6240), dec!(50000)),
            ),
        ),
        (
            FiscalYear(2020),
            year_rates(
                [
                    (dec!(12500), dec!(20)),
                    (dec!(50000), dec!(40)),
                    (dec!(150000), dec!(45)),
                ],
                // upper NI threshold is 4167 a month
                [(dec!(8632), dec!(12)), (dec!(50004), dec!(2))],
                (dec!(6136), dec!(50000)),
            ),
        ),
        (
            FiscalYear(2019),
            year_rates(
                [
                    (dec!(11850), dec!(20)),
                    (dec!(46350), dec!(40)),
                    (dec!(150000), dec!(45)),
                ],
                // 3863 a month
                [(dec!(8424), dec!(12)), (dec!(46356), dec!(2))],
                (dec!(6032), dec!(46350)),
            ),
        ),
    ]);
    RateTable { years }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_four_years() {
        let years: Vec<_> = RateTable::builtin().years().collect();
        assert_eq!(
            years,
            vec![
                FiscalYear(2019),
                FiscalYear(2020),
                FiscalYear(2021),
                FiscalYear(2022)
            ]
        );
    }

    #[test]
    fn builtin_is_valid() {
        RateTable::builtin().validate().unwrap();
    }

    #[test]
    fn lookup_2021_22_bands() {
        let table = RateTable::builtin();
        let year = FiscalYear(2022);

        let paye = table.levy_bands(year, LevyKind::IncomeTax).unwrap();
        assert_eq!(paye.len(), 3);
        assert_eq!(paye[0], RateBand::new(dec!(12579), dec!(20)));
        assert_eq!(paye[2], RateBand::new(dec!(150000), dec!(45)));

        let ni = table.levy_bands(year, LevyKind::SocialInsurance).unwrap();
        assert_eq!(ni.len(), 2);
        assert_eq!(ni[1], RateBand::new(dec!(50270), dec!(2)));

        assert_eq!(
            table.pension_band(year),
            Some(PensionBand {
                lower: dec!(6240),
                upper: dec!(50270)
            })
        );
    }

    #[test]
    fn unknown_year_is_none() {
        let table = RateTable::builtin();
        assert!(table.levy_bands(FiscalYear(1990), LevyKind::IncomeTax).is_none());
        assert!(table.pension_band(FiscalYear(1990)).is_none());
    }

    const CUSTOM: &str = r#"{
        "years": {
            "2022-2023": {
                "income_tax": [
                    {"threshold": 12570, "rate_pct": 20},
                    {"threshold": 50270, "rate_pct": 40},
                    {"threshold": 150000, "rate_pct": 45}
                ],
                "social_insurance": [
                    {"threshold": 12570, "rate_pct": 13.25},
                    {"threshold": 50270, "rate_pct": 3.25}
                ],
                "pension": {"lower": 6240, "upper": 50270}
            }
        }
    }"#;

    #[test]
    fn from_json_reads_years() {
        let table = RateTable::from_json(CUSTOM.as_bytes()).unwrap();
        let ni = table
            .levy_bands(FiscalYear(2023), LevyKind::SocialInsurance)
            .unwrap();
        assert_eq!(ni[0].rate_pct, dec!(13.25));
    }

    #[test]
    fn merge_adds_and_overrides() {
        let custom = RateTable::from_json(CUSTOM.as_bytes()).unwrap();
        let merged = RateTable::builtin().clone().merge(custom);
        assert_eq!(merged.years().count(), 5);

        let mut override_2022 = RateTable::default();
        let mut rates = merged.get(FiscalYear(2022)).unwrap().clone();
        rates.pension.upper = dec!(40000);
        override_2022.years.insert(FiscalYear(2022), rates);
        let merged = merged.merge(override_2022);
        assert_eq!(
            merged.pension_band(FiscalYear(2022)).unwrap().upper,
            dec!(40000)
        );
    }

    #[test]
    fn unsorted_thresholds_rejected() {
        let json = CUSTOM.replace("\"threshold\": 150000", "\"threshold\": 40000");
        let err = RateTable::from_json(json.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            RatesError::UnsortedBands {
                kind: LevyKind::IncomeTax,
                ..
            }
        ));
    }

    #[test]
    fn rate_above_100_rejected() {
        let json = CUSTOM.replace("\"rate_pct\": 45", "\"rate_pct\": 145");
        let err = RateTable::from_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, RatesError::RateOutOfRange { .. }));
    }

    #[test]
    fn inverted_pension_band_rejected() {
        let json = CUSTOM.replace("\"lower\": 6240", "\"lower\": 60000");
        let err = RateTable::from_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, RatesError::InvertedPensionBand { .. }));
    }

    #[test]
    fn malformed_json_rejected() {
        let err = RateTable::from_json("{\"years\": {\"bad\": {}}}".as_bytes()).unwrap_err();
        assert!(matches!(err, RatesError::Parse(_)));
    }
}
