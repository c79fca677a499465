//! Monte Carlo check of the spread + ADF procedure.
//!
//! Two scenarios, each `trials` times with a seeded RNG:
//!
//! 1. cointegrated pair `A = h·B + noise`: the hedge ratio should be recovered
//!    and the ADF test should reject the unit root
//! 2. independent random walks: the ADF test should mostly keep the unit root
//!
//! Rejection decisions here use p-values (5% for rejection, 10% for "kept").

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::coint::{adf_test, hedge_ratio, spread_series, standardize};
use crate::data::synthetic::{cointegrated_pair, independent_walks};
use crate::domain::{AdfOptions, AdfResult, SimulationConfig};
use crate::error::{AnalysisError, AppError};

/// Minimum series length accepted by the simulation.
const MIN_LEN: usize = 20;

/// Aggregated outcome of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub trials: usize,
    pub len: usize,
    pub hedge_ratio: f64,

    /// Cointegrated trials with p < 0.05.
    pub coint_rejected: usize,
    /// Cointegrated trials where the procedure errored.
    pub coint_failed: usize,
    pub mean_abs_hedge_error: f64,
    pub max_abs_hedge_error: f64,

    /// Random-walk trials with p > 0.10.
    pub walks_kept_null: usize,
    /// Random-walk trials with p < 0.05.
    pub walks_rejected: usize,
    pub walks_failed: usize,
}

impl SimulationSummary {
    /// Share of cointegrated trials where the unit root was rejected at 5%.
    pub fn power(&self) -> f64 {
        self.coint_rejected as f64 / self.trials as f64
    }

    /// Share of random-walk trials that (wrongly) rejected at 5%.
    pub fn false_rejection_rate(&self) -> f64 {
        self.walks_rejected as f64 / self.trials as f64
    }
}

pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationSummary, AppError> {
    if config.trials == 0 {
        return Err(AppError::new(2, "Simulation needs at least one trial."));
    }
    if config.len < MIN_LEN {
        return Err(AppError::new(2, format!("Simulated series need at least {MIN_LEN} observations.")));
    }
    if !(config.hedge_ratio.is_finite() && config.noise_sd.is_finite() && config.noise_sd > 0.0) {
        return Err(AppError::new(2, "Invalid hedge ratio or noise settings."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut coint_rejected = 0;
    let mut coint_failed = 0;
    let mut hedge_errors = Vec::with_capacity(config.trials);
    for trial in 0..config.trials {
        let (a, b) = cointegrated_pair(&mut rng, config.len, config.hedge_ratio, config.noise_sd);
        match spread_adf(&a, &b, &config.adf) {
            Ok((h, adf)) => {
                hedge_errors.push((h - config.hedge_ratio).abs());
                if adf.p_value < 0.05 {
                    coint_rejected += 1;
                }
            }
            Err(err) => {
                debug!(trial, error = %err, "cointegrated trial failed");
                coint_failed += 1;
            }
        }
    }

    let mut walks_kept_null = 0;
    let mut walks_rejected = 0;
    let mut walks_failed = 0;
    for trial in 0..config.trials {
        let (a, b) = independent_walks(&mut rng, config.len);
        match spread_adf(&a, &b, &config.adf) {
            Ok((_, adf)) => {
                if adf.p_value > 0.10 {
                    walks_kept_null += 1;
                }
                if adf.p_value < 0.05 {
                    walks_rejected += 1;
                }
            }
            Err(err) => {
                debug!(trial, error = %err, "random-walk trial failed");
                walks_failed += 1;
            }
        }
    }

    let (mean_abs_hedge_error, max_abs_hedge_error) = if hedge_errors.is_empty() {
        (f64::NAN, f64::NAN)
    } else {
        (
            hedge_errors.iter().sum::<f64>() / hedge_errors.len() as f64,
            hedge_errors.iter().copied().fold(0.0, f64::max),
        )
    };

    let summary = SimulationSummary {
        trials: config.trials,
        len: config.len,
        hedge_ratio: config.hedge_ratio,
        coint_rejected,
        coint_failed,
        mean_abs_hedge_error,
        max_abs_hedge_error,
        walks_kept_null,
        walks_rejected,
        walks_failed,
    };
    info!(
        power = summary.power(),
        false_rejection_rate = summary.false_rejection_rate(),
        "simulation finished"
    );
    Ok(summary)
}

fn spread_adf(a: &[f64], b: &[f64], opts: &AdfOptions) -> Result<(f64, AdfResult), AnalysisError> {
    let h = hedge_ratio(a, b)?;
    let z = standardize(&spread_series(a, b, h))?;
    Ok((h, adf_test(&z, opts)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(trials: usize) -> SimulationConfig {
        SimulationConfig {
            trials,
            len: 300,
            hedge_ratio: 1.5,
            noise_sd: 1.0,
            seed: 42,
            adf: AdfOptions::default(),
        }
    }

    #[test]
    fn cointegrated_pairs_are_detected_and_walks_are_not() {
        let s = run_simulation(&config(60)).unwrap();

        assert_eq!(s.coint_failed, 0);
        assert_eq!(s.walks_failed, 0);
        assert!(s.max_abs_hedge_error < 0.05, "max hedge error {}", s.max_abs_hedge_error);
        assert!(s.coint_rejected >= 58, "power {}/60", s.coint_rejected);

        assert!(s.walks_kept_null >= 45, "kept null {}/60", s.walks_kept_null);
        assert!(s.walks_rejected <= 10, "rejected {}/60", s.walks_rejected);
    }

    #[test]
    fn same_seed_same_summary() {
        let a = run_simulation(&config(10)).unwrap();
        let b = run_simulation(&config(10)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert_eq!(run_simulation(&config(0)).unwrap_err().exit_code(), 2);
        let mut c = config(5);
        c.len = 5;
        assert_eq!(run_simulation(&c).unwrap_err().exit_code(), 2);
        let mut c = config(5);
        c.noise_sd = 0.0;
        assert!(run_simulation(&c).is_err());
    }
}
