//! Progressive marginal-rate levies (income tax and national insurance).

use super::amount::round;
use super::rates::RateBand;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Amount of `income` falling inside each band, paired with the band.
///
/// A band covers income strictly above its threshold up to and including the
/// next band's threshold; the last band is unbounded.
pub fn band_slices(income: Decimal, bands: &[RateBand]) -> Vec<(RateBand, Decimal)> {
    bands
        .iter()
        .enumerate()
        .map(|(i, band)| {
            let ceiling = bands.get(i + 1).map_or(income, |next| income.min(next.threshold));
            let slice = (ceiling - band.threshold).max(Decimal::ZERO);
            (*band, slice)
        })
        .collect()
}

/// Total levy on `income`, rounded to pence, or `None` if it overflows.
pub fn levy(income: Decimal, bands: &[RateBand]) -> Option<Decimal> {
    let total = band_slices(income, bands)
        .into_iter()
        .try_fold(Decimal::ZERO, |total, (band, slice)| {
            let charge = slice.checked_mul(band.rate_pct)? / dec!(100);
            if !slice.is_zero() {
                log::debug!(
                    "{} above {} at {}% = {}",
                    slice,
                    band.threshold,
                    band.rate_pct,
                    charge
                );
            }
            total.checked_add(charge)
        })?;
    Some(round(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::{LevyKind, RateProvider, RateTable};
    use crate::core::year::FiscalYear;
    use proptest::prelude::*;

    fn paye() -> &'static [RateBand] {
        RateTable::builtin()
            .levy_bands(FiscalYear(2022), LevyKind::IncomeTax)
            .unwrap()
    }

    fn ni() -> &'static [RateBand] {
        RateTable::builtin()
            .levy_bands(FiscalYear(2022), LevyKind::SocialInsurance)
            .unwrap()
    }

    #[test]
    fn income_tax_below_personal_allowance() {
        assert_eq!(levy(dec!(5451), paye()), Some(dec!(0.00)));
    }

    #[test]
    fn income_tax_basic_rate() {
        assert_eq!(levy(dec!(29864.12), paye()), Some(dec!(3457.02)));
    }

    #[test]
    fn income_tax_higher_rate() {
        assert_eq!(levy(dec!(57012.28), paye()), Some(dec!(10233.31)));
    }

    #[test]
    fn income_tax_additional_rate() {
        assert_eq!(levy(dec!(165245.25), paye()), Some(dec!(54288.76)));
    }

    #[test]
    fn national_insurance_below_threshold() {
        assert_eq!(levy(dec!(5168.56), ni()), Some(dec!(0.00)));
    }

    #[test]
    fn national_insurance_above_upper_limit() {
        assert_eq!(levy(dec!(75846.94), ni()), Some(dec!(5395.78)));
    }

    #[test]
    fn income_on_threshold_is_not_charged_at_next_rate() {
        // 50279 sits in the basic band: only 20% applies
        assert_eq!(levy(dec!(50279), paye()), Some(dec!(7540.00)));
        assert_eq!(levy(dec!(12579), paye()), Some(dec!(0)));
    }

    #[test]
    fn slices_cover_income_above_first_threshold() {
        let slices = band_slices(dec!(57012.28), paye());
        let amounts: Vec<_> = slices.iter().map(|(_, s)| *s).collect();
        assert_eq!(amounts, vec![dec!(37700), dec!(6733.28), dec!(0)]);
    }

    #[test]
    fn single_band_is_flat_above_threshold() {
        let bands = [RateBand::new(dec!(1000), dec!(10))];
        assert_eq!(levy(dec!(3000), &bands), Some(dec!(200)));
        assert_eq!(levy(dec!(500), &bands), Some(dec!(0)));
    }

    #[test]
    fn no_bands_no_levy() {
        assert_eq!(levy(dec!(100000), &[]), Some(dec!(0)));
    }

    #[test]
    fn overflowing_levy_is_none() {
        assert_eq!(levy(Decimal::MAX, paye()), None);
    }

    fn income() -> impl Strategy<Value = Decimal> {
        (0u64..30_000_000u64).prop_map(|pence| Decimal::new(pence as i64, 2))
    }

    proptest! {
        #[test]
        fn zero_at_or_below_first_threshold(pence in 0u64..=1_257_900u64) {
            let income = Decimal::new(pence as i64, 2);
            prop_assert_eq!(levy(income, paye()), Some(Decimal::ZERO));
        }

        #[test]
        fn monotonic_in_income(a in income(), b in income()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(levy(lo, paye()) <= levy(hi, paye()));
            prop_assert!(levy(lo, ni()) <= levy(hi, ni()));
        }

        #[test]
        fn continuous_at_band_boundaries(band in 0usize..3) {
            let threshold = paye()[band].threshold;
            let above = levy(threshold + dec!(0.01), paye()).unwrap();
            let at = levy(threshold, paye()).unwrap();
            // one penny at the highest marginal rate
            prop_assert!(above - at <= dec!(0.01));
        }
    }
}
