//! Hedge ratio, spread and standardization.
//!
//! The hedge ratio is the slope of a regression of the dependent leg on the
//! independent leg **without an intercept**:
//!
//! ```text
//! h = argmin Σ (A_t - h B_t)²  =  Σ A_t B_t / Σ B_t²
//! ```
//!
//! There is no intercept term: any
//! level difference between the legs ends up in the spread's mean, which the
//! standardization step removes anyway.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{DateWindow, Pair, PairSpread, PriceTable};
use crate::error::AnalysisError;
use crate::math::{is_constant, mean, sample_std, solve_least_squares};

/// OLS slope of `dependent` on `independent`, no intercept.
///
/// Fails with `DegenerateRegression` when the regressor is constant (the
/// regression would not identify a relationship between the legs).
pub fn hedge_ratio(dependent: &[f64], independent: &[f64]) -> Result<f64, AnalysisError> {
    if dependent.len() != independent.len() {
        return Err(AnalysisError::insufficient(
            dependent.len(),
            independent.len(),
            "hedge ratio legs of different length",
        ));
    }
    let n = dependent.len();
    if n < 2 {
        return Err(AnalysisError::insufficient(2, n, "hedge ratio regression"));
    }
    if is_constant(independent) {
        return Err(AnalysisError::DegenerateRegression(
            "Regressor is constant over the estimation window; hedge ratio is undefined.".to_string(),
        ));
    }

    let x = DMatrix::from_column_slice(n, 1, independent);
    let y = DVector::from_column_slice(dependent);
    let beta = solve_least_squares(&x, &y).ok_or_else(|| {
        AnalysisError::DegenerateRegression("Hedge ratio regression is singular.".to_string())
    })?;
    Ok(beta[0])
}

/// `spread_t = dependent_t - h · independent_t`.
pub fn spread_series(dependent: &[f64], independent: &[f64], hedge_ratio: f64) -> Vec<f64> {
    dependent
        .iter()
        .zip(independent)
        .map(|(a, b)| a - hedge_ratio * b)
        .collect()
}

/// Standardize to zero mean and unit sample standard deviation.
pub fn standardize(series: &[f64]) -> Result<Vec<f64>, AnalysisError> {
    if series.len() < 2 {
        return Err(AnalysisError::insufficient(2, series.len(), "spread standardization"));
    }
    let m = mean(series);
    let sd = sample_std(series);
    if !(sd.is_finite() && sd > 0.0) {
        return Err(AnalysisError::DegenerateRegression(
            "Spread has zero variance; cannot standardize.".to_string(),
        ));
    }
    Ok(series.iter().map(|x| (x - m) / sd).collect())
}

/// Estimate the hedge ratio over `window` and build the standardized spread.
pub fn compute_pair_spread(
    table: &PriceTable,
    pair: &Pair,
    window: &DateWindow,
) -> Result<PairSpread, AnalysisError> {
    let sub = table.window(window);
    let a = sub.column(&pair.dependent)?;
    let b = sub.column(&pair.independent)?;
    if sub.len() < 2 {
        return Err(AnalysisError::insufficient(
            2,
            sub.len(),
            format!("{pair} observations in window {window}"),
        ));
    }

    let h = hedge_ratio(a, b)?;
    let spread = spread_series(a, b, h);
    let zscore = standardize(&spread)?;

    debug!(pair = %pair, hedge_ratio = h, n = sub.len(), "computed spread");

    Ok(PairSpread {
        pair: pair.clone(),
        dates: sub.dates,
        hedge_ratio: h,
        spread,
        zscore,
    })
}

/// Compute spreads for several pairs; each pair succeeds or fails on its own.
pub fn compute_spreads(
    table: &PriceTable,
    pairs: &[Pair],
    window: &DateWindow,
) -> Vec<Result<PairSpread, AnalysisError>> {
    pairs
        .iter()
        .map(|pair| compute_pair_spread(table, pair, window))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::{cointegrated_pair, price_table};
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    }

    #[test]
    fn hedge_ratio_closed_form() {
        let b = [1.0, 2.0, 3.0, 4.0];
        let a = [2.1, 3.9, 6.2, 7.8];
        let expected: f64 = a.iter().zip(&b).map(|(a, b)| a * b).sum::<f64>() / b.iter().map(|b| b * b).sum::<f64>();
        let h = hedge_ratio(&a, &b).unwrap();
        assert!((h - expected).abs() < 1e-12);
    }

    #[test]
    fn hedge_ratio_has_no_intercept() {
        // A = 10 + B has OLS slope 1 with an intercept, but not without one.
        let b = [1.0, 2.0, 3.0, 4.0, 5.0];
        let a: Vec<f64> = b.iter().map(|x| 10.0 + x).collect();
        let h = hedge_ratio(&a, &b).unwrap();
        assert!((h - 1.0).abs() > 1.0);
    }

    #[test]
    fn constant_regressor_is_degenerate() {
        let a = [1.0, 2.0, 3.0];
        for b in [[5.0, 5.0, 5.0], [0.0, 0.0, 0.0]] {
            let err = hedge_ratio(&a, &b).unwrap_err();
            assert!(matches!(err, AnalysisError::DegenerateRegression(_)), "{err:?}");
        }
    }

    #[test]
    fn too_short_or_mismatched_legs_fail() {
        assert!(matches!(
            hedge_ratio(&[1.0], &[2.0]),
            Err(AnalysisError::InsufficientData { .. })
        ));
        assert!(matches!(
            hedge_ratio(&[1.0, 2.0], &[2.0]),
            Err(AnalysisError::InsufficientData { .. })
        ));
    }

    #[test]
    fn hedge_ratio_is_bit_stable() {
        let mut rng = StdRng::seed_from_u64(9);
        let (a, b) = cointegrated_pair(&mut rng, 300, 0.75, 1.0);
        let h1 = hedge_ratio(&a, &b).unwrap();
        let h2 = hedge_ratio(&a, &b).unwrap();
        assert_eq!(h1.to_bits(), h2.to_bits());
    }

    #[test]
    fn standardized_spread_has_zero_mean_unit_std() {
        let mut rng = StdRng::seed_from_u64(4);
        let (a, b) = cointegrated_pair(&mut rng, 500, 2.0, 1.0);
        let table = price_table(start(), vec![("A".to_string(), a), ("B".to_string(), b)]);

        let ps = compute_pair_spread(&table, &Pair::new("A", "B"), &DateWindow::default()).unwrap();
        assert!((ps.hedge_ratio - 2.0).abs() < 0.05, "h = {}", ps.hedge_ratio);
        assert!(mean(&ps.zscore).abs() < 1e-10);
        assert!((sample_std(&ps.zscore) - 1.0).abs() < 1e-10);
        assert_eq!(ps.dates.len(), ps.zscore.len());
    }

    #[test]
    fn window_restricts_estimation_sample() {
        let a: Vec<f64> = (0..10).map(|i| 2.0 * (i as f64 + 1.0) + if i % 2 == 0 { 0.1 } else { -0.1 }).collect();
        let b: Vec<f64> = (0..10).map(|i| i as f64 + 1.0).collect();
        let table = price_table(start(), vec![("A".to_string(), a), ("B".to_string(), b)]);

        let window = DateWindow::new(Some(table.dates[2]), Some(table.dates[6]));
        let ps = compute_pair_spread(&table, &Pair::new("A", "B"), &window).unwrap();
        assert_eq!(ps.dates, table.dates[2..=6].to_vec());

        let full = compute_pair_spread(&table, &Pair::new("A", "B"), &DateWindow::default()).unwrap();
        assert_ne!(ps.hedge_ratio, full.hedge_ratio);
    }

    #[test]
    fn empty_window_is_insufficient_and_pairs_fail_independently() {
        let table = price_table(
            start(),
            vec![
                ("A".to_string(), vec![1.0, 2.0, 3.5, 4.0]),
                ("B".to_string(), vec![1.0, 2.0, 3.0, 4.0]),
                ("C".to_string(), vec![7.0, 7.0, 7.0, 7.0]),
            ],
        );
        let late = DateWindow::new(Some(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()), None);
        assert!(matches!(
            compute_pair_spread(&table, &Pair::new("A", "B"), &late),
            Err(AnalysisError::InsufficientData { actual: 0, .. })
        ));

        let results = compute_spreads(
            &table,
            &[Pair::new("A", "C"), Pair::new("A", "B"), Pair::new("A", "Z")],
            &DateWindow::default(),
        );
        assert!(matches!(results[0], Err(AnalysisError::DegenerateRegression(_))));
        assert!(results[1].is_ok());
        assert!(matches!(results[2], Err(AnalysisError::UnknownTicker(_))));
    }
}
