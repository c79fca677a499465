//! MacKinnon response surfaces for the Dickey-Fuller distribution.
//!
//! Only the case used here is tabulated: one variable, regression with a
//! constant and no trend.
//!
//! - p-values: MacKinnon (1994), "Approximate asymptotic distribution functions
//!   for unit-root and cointegration tests". The statistic is mapped through a
//!   polynomial and then the standard normal CDF; one polynomial covers the
//!   lower tail, another the rest.
//! - critical values: MacKinnon (2010), "Critical values for cointegration
//!   tests", `cv(n) = b0 + b1/n + b2/n² + b3/n³`.

use statrs::function::erf::erfc;

use crate::domain::CriticalValues;

/// Above this the p-value is 1.
const TAU_MAX: f64 = 2.74;
/// Below this the p-value is 0.
const TAU_MIN: f64 = -18.86;
/// Switch point between the lower-tail and upper polynomials.
const TAU_STAR: f64 = -1.61;

/// Lower-tail polynomial (ascending powers).
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 3.8269e-2];
/// Upper polynomial (ascending powers).
const TAU_LARGE_P: [f64; 4] = [1.7339, 9.3202e-1, -1.2745e-1, -1.0368e-2];

/// Finite-sample critical value coefficients for 1%, 5%, 10%.
const TAU_C_2010: [[f64; 4]; 3] = [
    [-3.43035, -6.5393, -16.786, -79.433],
    [-2.86154, -2.8903, -4.234, -40.040],
    [-2.56677, -1.5384, -2.809, 0.0],
];

/// Approximate p-value of an ADF statistic (constant, no trend).
pub fn mackinnon_p_value(stat: f64) -> f64 {
    if stat.is_nan() {
        return f64::NAN;
    }
    if stat > TAU_MAX {
        return 1.0;
    }
    if stat < TAU_MIN {
        return 0.0;
    }

    let z = if stat <= TAU_STAR {
        polyval(&TAU_SMALL_P, stat)
    } else {
        polyval(&TAU_LARGE_P, stat)
    };
    std_normal_cdf(z)
}

/// Critical values for a regression with `n_obs` observations.
pub fn mackinnon_critical_values(n_obs: usize) -> CriticalValues {
    let inv_n = 1.0 / n_obs.max(1) as f64;
    CriticalValues {
        one_pct: polyval(&TAU_C_2010[0], inv_n),
        five_pct: polyval(&TAU_C_2010[1], inv_n),
        ten_pct: polyval(&TAU_C_2010[2], inv_n),
    }
}

/// Evaluate `c[0] + c[1] x + c[2] x² + ...` (Horner).
fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn std_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p_value_clamps_outside_table() {
        assert_eq!(mackinnon_p_value(3.0), 1.0);
        assert_eq!(mackinnon_p_value(-25.0), 0.0);
        assert!(mackinnon_p_value(f64::NAN).is_nan());
    }

    #[test]
    fn p_value_matches_reference_points() {
        // Asymptotic 5% and 10% points of the constant-only distribution.
        assert!((mackinnon_p_value(-2.86) - 0.05).abs() < 2e-3);
        assert!((mackinnon_p_value(-2.57) - 0.10).abs() < 2e-3);
        // Reference outputs of the standard ADF routine.
        assert!((mackinnon_p_value(-4.808291) - 0.000052).abs() < 2e-6);
        assert!((mackinnon_p_value(0.815369) - 0.991880).abs() < 1e-5);
    }

    #[test]
    fn p_value_is_monotone_and_nearly_continuous_at_switch() {
        let mut prev = 0.0;
        let mut stat = -18.0;
        while stat < 2.7 {
            let p = mackinnon_p_value(stat);
            assert!(p >= prev, "p-value decreased at {stat}");
            assert!((0.0..=1.0).contains(&p));
            prev = p;
            stat += 0.01;
        }

        let below = mackinnon_p_value(TAU_STAR);
        let above = mackinnon_p_value(TAU_STAR + 1e-9);
        assert!((below - above).abs() < 2e-3);
    }

    #[test]
    fn critical_values_for_finite_sample() {
        let cv = mackinnon_critical_values(130);
        assert!((cv.one_pct - -3.4817).abs() < 1e-3);
        assert!((cv.five_pct - -2.8840).abs() < 1e-3);
        assert!((cv.ten_pct - -2.5788).abs() < 1e-3);

        // Converges to the asymptotic values.
        let cv = mackinnon_critical_values(1_000_000);
        assert!((cv.five_pct - -2.86154).abs() < 1e-5);
        assert!(cv.one_pct < cv.five_pct && cv.five_pct < cv.ten_pct);
    }

    #[test]
    fn std_normal_cdf_reference_values() {
        assert!((std_normal_cdf(0.0) - 0.5).abs() < 1e-15);
        assert!((std_normal_cdf(1.959964) - 0.975).abs() < 1e-6);
        assert!((std_normal_cdf(-1.644854) - 0.05).abs() < 1e-6);
    }
}
