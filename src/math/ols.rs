//! Ordinary least squares.
//!
//! Two consumers:
//!
//! - the hedge ratio, a one-column regression without intercept
//! - the ADF auxiliary regressions, which also need standard errors, t-values
//!   and information criteria for lag selection
//!
//! Implementation choices:
//! - Coefficients come from an SVD solve, which handles tall design matrices
//!   and reports rank deficiency instead of returning garbage.
//! - Standard errors use `σ² (XᵀX)⁻¹` with `σ² = SSR / (n - k)`.
//! - Log-likelihood is the Gaussian concentrated likelihood, so
//!   `AIC = -2 llf + 2k` and `BIC = -2 llf + k ln(n)` match the usual
//!   econometrics conventions.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // A rank-deficient design gives infinitely many solutions; refuse it rather
    // than silently picking the minimum-norm one.
    let max_sv = svd.singular_values.max();
    if !(max_sv.is_finite() && max_sv > 0.0) {
        return None;
    }
    let rank = svd.rank(max_sv * 1e-12 * (x.nrows().max(x.ncols()) as f64));
    if rank < x.ncols() {
        return None;
    }

    let beta = svd.solve(y, 0.0).ok()?;
    beta.iter().all(|v| v.is_finite()).then_some(beta)
}

/// A fitted linear regression with inference statistics.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub params: DVector<f64>,
    pub std_errors: DVector<f64>,
    /// Sum of squared residuals.
    pub ssr: f64,
    pub n_obs: usize,
    pub n_params: usize,
}

impl OlsFit {
    /// Fit `y = Xβ + ε`. Returns `None` when the design is singular or the
    /// regression has no residual degrees of freedom.
    pub fn fit(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<OlsFit> {
        let n = x.nrows();
        let k = x.ncols();
        if n != y.len() || n <= k {
            return None;
        }

        let params = solve_least_squares(x, y)?;
        let resid = y - x * &params;
        let ssr = resid.dot(&resid);

        let xtx_inv = (x.transpose() * x).try_inverse()?;
        let sigma2 = ssr / (n - k) as f64;
        let std_errors = DVector::from_iterator(k, (0..k).map(|i| (sigma2 * xtx_inv[(i, i)]).max(0.0).sqrt()));

        Some(OlsFit {
            params,
            std_errors,
            ssr,
            n_obs: n,
            n_params: k,
        })
    }

    pub fn t_value(&self, idx: usize) -> f64 {
        self.params[idx] / self.std_errors[idx]
    }

    /// Gaussian log-likelihood at the OLS estimate.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.n_obs as f64;
        -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.n_params as f64
    }

    pub fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood() + (self.n_obs as f64).ln() * self.n_params as f64
    }
}
