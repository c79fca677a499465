//! Synthetic price generation for checking the test procedure.
//!
//! Two data-generating processes matter:
//!
//! - **cointegrated pair**: `B` is a random walk and `A_t = h·B_t + u_t` with
//!   stationary noise `u_t`. The spread is stationary by construction.
//! - **independent random walks**: no linear combination is stationary, so the
//!   ADF test should mostly keep its unit-root null.
//!
//! Every generator takes the RNG by reference so callers control seeding
//! (`StdRng::seed_from_u64`) and runs are reproducible.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::domain::PriceTable;

/// Level of the first observation of generated price paths.
pub const DEFAULT_START_PRICE: f64 = 100.0;

/// Gaussian random walk starting at `start` with step standard deviation `sd`.
pub fn random_walk<R: Rng>(rng: &mut R, n: usize, start: f64, sd: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(n);
    let mut level = start;
    for i in 0..n {
        if i > 0 {
            level += sd * normal(rng);
        }
        out.push(level);
    }
    out
}

/// Zero-mean AR(1) `x_t = φ x_{t-1} + ε_t`, `ε ~ N(0, sd²)`.
///
/// `phi = 0` gives white noise.
pub fn ar1_series<R: Rng>(rng: &mut R, n: usize, phi: f64, sd: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(n);
    let mut x = 0.0;
    for _ in 0..n {
        x = phi * x + sd * normal(rng);
        out.push(x);
    }
    out
}

/// `(A, B)` with `B` a random walk and `A = hedge_ratio·B + white noise`.
pub fn cointegrated_pair<R: Rng>(
    rng: &mut R,
    n: usize,
    hedge_ratio: f64,
    noise_sd: f64,
) -> (Vec<f64>, Vec<f64>) {
    let b = random_walk(rng, n, DEFAULT_START_PRICE, 1.0);
    let a = b.iter().map(|&bt| hedge_ratio * bt + noise_sd * normal(rng)).collect();
    (a, b)
}

/// Two random walks driven by independent shocks.
pub fn independent_walks<R: Rng>(rng: &mut R, n: usize) -> (Vec<f64>, Vec<f64>) {
    let a = random_walk(rng, n, DEFAULT_START_PRICE, 1.0);
    let b = random_walk(rng, n, DEFAULT_START_PRICE, 1.0);
    (a, b)
}

/// `n` consecutive weekdays starting at (or after) `start`.
pub fn business_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut d = start;
    while out.len() < n {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(d);
        }
        d += Duration::days(1);
    }
    out
}

/// Wrap generated columns into a `PriceTable` on a business-day index.
///
/// All columns must have the same length.
pub fn price_table(start: NaiveDate, columns: Vec<(String, Vec<f64>)>) -> PriceTable {
    let n = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
    debug_assert!(columns.iter().all(|(_, c)| c.len() == n));
    let (tickers, columns): (Vec<String>, Vec<Vec<f64>>) = columns.into_iter().unzip();
    PriceTable {
        dates: business_days(start, n),
        tickers,
        columns,
    }
}

fn normal<R: Rng>(rng: &mut R) -> f64 {
    rng.sample(StandardNormal)
}
