//! Augmented Dickey-Fuller unit-root test.
//!
//! Test regression (constant, no trend), for a lag order `p`:
//!
//! ```text
//! Δy_t = α + γ y_{t-1} + Σ_{i=1..p} φ_i Δy_{t-i} + ε_t
//! ```
//!
//! H0: `γ = 0` (unit root, non-stationary). The statistic is the t-value of `γ`
//! and is compared against the Dickey-Fuller distribution, not Student's t.
//!
//! Lag order selection:
//! - every candidate `p ∈ 0..=max_lag` is fitted on the *same* sample (the
//!   rows available at `max_lag`), so information criteria are comparable
//! - the chosen `p` is re-estimated on the largest sample it allows
//!
//! Default `max_lag` is Schwert's rule `ceil(12 (n/100)^{1/4})`, capped so the
//! regression keeps at least half the sample.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::coint::mackinnon::{mackinnon_critical_values, mackinnon_p_value};
use crate::domain::{AdfOptions, AdfResult, AutoLag};
use crate::error::AnalysisError;
use crate::math::{OlsFit, diff, is_constant};

/// Two-sided 10% normal quantile used by `AutoLag::TStat`.
const TSTAT_STOP: f64 = 1.644_853_626_951_472_2;

/// Deterministic terms in the test regression (constant only).
const N_TREND: usize = 1;

/// Run the ADF test on `series`.
pub fn adf_test(series: &[f64], opts: &AdfOptions) -> Result<AdfResult, AnalysisError> {
    let n = series.len();
    if n < 4 {
        return Err(AnalysisError::insufficient(4, n, "ADF test"));
    }
    if is_constant(series) {
        return Err(AnalysisError::DegenerateRegression(
            "ADF input series is constant.".to_string(),
        ));
    }

    let max_lag = resolve_max_lag(n, opts.max_lag)?;
    let dy = diff(series);

    let (used_lag, ic_best) = match opts.autolag {
        AutoLag::None => (max_lag, None),
        method => select_lag(series, &dy, max_lag, method)?,
    };

    let fit = fit_adf_regression(series, &dy, used_lag, used_lag)?;
    let statistic = fit.t_value(0);
    if !statistic.is_finite() {
        return Err(AnalysisError::DegenerateRegression(
            "ADF statistic is not finite (zero residual variance).".to_string(),
        ));
    }

    let result = AdfResult {
        statistic,
        p_value: mackinnon_p_value(statistic),
        used_lag,
        n_obs: fit.n_obs,
        max_lag,
        ic_best,
        critical_values: mackinnon_critical_values(fit.n_obs),
    };

    debug!(
        n,
        max_lag,
        used_lag,
        n_obs = result.n_obs,
        statistic = result.statistic,
        p_value = result.p_value,
        "adf test"
    );
    Ok(result)
}

fn resolve_max_lag(n: usize, requested: Option<usize>) -> Result<usize, AnalysisError> {
    // Largest lag that still leaves half the sample for estimation.
    let cap = (n / 2) as isize - N_TREND as isize - 1;
    if cap < 0 {
        return Err(AnalysisError::insufficient(
            2 * (N_TREND + 1),
            n,
            "sample too short for the ADF regression",
        ));
    }
    let cap = cap as usize;

    match requested {
        Some(lag) if lag > cap => Err(AnalysisError::insufficient(
            2 * (lag + N_TREND + 1),
            n,
            format!("ADF max lag {lag}"),
        )),
        Some(lag) => Ok(lag),
        None => {
            let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
            Ok(schwert.min(cap))
        }
    }
}

/// Pick the lag order by information criterion or sequential t-test.
///
/// Returns the lag and, for AIC/BIC, the best criterion value.
fn select_lag(
    y: &[f64],
    dy: &[f64],
    max_lag: usize,
    method: AutoLag,
) -> Result<(usize, Option<f64>), AnalysisError> {
    let fits = fit_lag_candidates(y, dy, max_lag);

    if fits.is_empty() {
        return Err(AnalysisError::DegenerateRegression(
            "No ADF lag candidate could be estimated.".to_string(),
        ));
    }

    match method {
        AutoLag::Aic | AutoLag::Bic => {
            let mut best: Option<(usize, f64)> = None;
            for (lag, fit) in &fits {
                let ic = if method == AutoLag::Aic { fit.aic() } else { fit.bic() };
                // Strict comparison: ties keep the smaller lag.
                if best.is_none_or(|(_, b)| ic < b) {
                    best = Some((*lag, ic));
                }
            }
            let (lag, ic) = best.ok_or_else(|| {
                AnalysisError::DegenerateRegression("ADF lag selection found no candidate.".to_string())
            })?;
            Ok((lag, Some(ic)))
        }
        AutoLag::TStat => {
            // Drop lags from the top while the last lagged difference is insignificant.
            for (lag, fit) in fits.iter().rev() {
                if *lag == 0 || fit.t_value(fit.n_params - 2).abs() >= TSTAT_STOP {
                    return Ok((*lag, None));
                }
            }
            Ok((0, None))
        }
        AutoLag::None => Ok((max_lag, None)),
    }
}

/// Fit every lag in `0..=max_lag` on the common sample. Candidates that
/// cannot be estimated are logged and left out.
fn fit_lag_candidates(y: &[f64], dy: &[f64], max_lag: usize) -> Vec<(usize, OlsFit)> {
    (0..=max_lag)
        .filter_map(|lag| match fit_adf_regression(y, dy, lag, max_lag) {
            Ok(fit) => Some((lag, fit)),
            Err(err) => {
                debug!(lag, max_lag, error = %err, "skipping ADF lag candidate");
                None
            }
        })
        .collect()
}

/// Estimate the ADF regression with `lag` lagged differences, using the rows
/// available when `trim` lags are reserved (`trim >= lag`).
///
/// Column layout: `[y_{t-1}, Δy_{t-1}, ..., Δy_{t-lag}, 1]`.
fn fit_adf_regression(y: &[f64], dy: &[f64], lag: usize, trim: usize) -> Result<OlsFit, AnalysisError> {
    let n_obs = dy.len().saturating_sub(trim);
    let k = 1 + lag + N_TREND;
    if n_obs <= k {
        return Err(AnalysisError::insufficient(
            k + 2 + trim,
            y.len(),
            format!("ADF regression with {lag} lag(s)"),
        ));
    }

    let x = DMatrix::from_fn(n_obs, k, |r, c| {
        let t = trim + r;
        match c {
            0 => y[t],
            c if c <= lag => dy[t - c],
            _ => 1.0,
        }
    });
    let target = DVector::from_iterator(n_obs, dy[trim..].iter().copied());

    OlsFit::fit(&x, &target).ok_or_else(|| {
        AnalysisError::DegenerateRegression(format!("ADF regression with {lag} lag(s) is singular."))
    })
}
