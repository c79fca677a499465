//! Shared analysis pipeline.
//!
//! load prices -> per pair: align the two legs -> hedge ratio -> standardized spread -> ADF
//!
//! Failures are isolated per pair: a missing price file, two legs without
//! common dates or a degenerate regression marks that pair as failed and the
//! rest still run. Only a run with no usable prices at all is a hard error.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::coint::{adf_test, compute_pair_spread};
use crate::domain::{AdfOptions, AnalysisConfig, DateWindow, Pair, PairAnalysis, PriceSeries, PriceTable};
use crate::error::{AnalysisError, AppError};
use crate::io::ingest::{align_prices, load_price_series, price_file_path};

/// Result for one configured pair.
#[derive(Debug, Clone)]
pub struct PairOutcome {
    pub pair: Pair,
    /// The pair's two legs inner-joined on date (before windowing), when alignment succeeded.
    pub prices: Option<PriceTable>,
    pub result: Result<PairAnalysis, AnalysisError>,
}

/// All computed outputs of a single `coint analyze` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Every ticker referenced by the configured pairs, in first-seen order.
    pub tickers: Vec<String>,
    /// Series that loaded successfully.
    pub loaded: Vec<PriceSeries>,
    pub outcomes: Vec<PairOutcome>,
}

impl RunOutput {
    pub fn successes(&self) -> impl Iterator<Item = &PairAnalysis> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn first_failure(&self) -> Option<&AnalysisError> {
        self.outcomes.iter().find_map(|o| o.result.as_ref().err())
    }
}

/// Execute the full pipeline from the price files named by `config`.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    if config.pairs.is_empty() {
        return Err(AppError::new(2, "No pairs configured."));
    }

    // 1) Load each ticker once; remember per-ticker failures for the pairs that need them.
    let tickers = config.tickers();
    let mut loaded: HashMap<String, PriceSeries> = HashMap::new();
    let mut load_errors: HashMap<String, AnalysisError> = HashMap::new();
    for ticker in &tickers {
        let path = price_file_path(&config.data_dir, ticker);
        match load_price_series(&path, ticker) {
            Ok(series) => {
                loaded.insert(ticker.clone(), series);
            }
            Err(err) => {
                warn!(ticker = %ticker, error = %err, "failed to load prices");
                load_errors.insert(ticker.clone(), err);
            }
        }
    }

    if loaded.is_empty() {
        let first = tickers
            .iter()
            .find_map(|t| load_errors.remove(t))
            .map(AppError::from)
            .unwrap_or_else(|| AppError::new(2, "No price files could be loaded."));
        return Err(first);
    }
    info!(loaded = loaded.len(), tickers = tickers.len(), window = %config.window, "loaded price files");

    // 2) Align and analyze each pair on its own.
    let outcomes = config
        .pairs
        .iter()
        .map(|pair| {
            let legs = [&pair.dependent, &pair.independent].map(|t| match loaded.get(t.as_str()) {
                Some(series) => Ok(series.clone()),
                None => Err(load_errors
                    .get(t.as_str())
                    .cloned()
                    .unwrap_or_else(|| AnalysisError::UnknownTicker(t.clone()))),
            });
            let outcome = match legs {
                [Ok(a), Ok(b)] => match align_prices(&[a, b]) {
                    Ok(table) => PairOutcome {
                        pair: pair.clone(),
                        result: analyze_pair(&table, pair, &config.window, &config.adf),
                        prices: Some(table),
                    },
                    Err(err) => PairOutcome {
                        pair: pair.clone(),
                        prices: None,
                        result: Err(err),
                    },
                },
                [Err(err), _] | [_, Err(err)] => PairOutcome {
                    pair: pair.clone(),
                    prices: None,
                    result: Err(err),
                },
            };
            log_outcome(pair, &outcome.result);
            outcome
        })
        .collect();

    let loaded = tickers.iter().filter_map(|t| loaded.remove(t)).collect();
    Ok(RunOutput {
        tickers,
        loaded,
        outcomes,
    })
}

/// Hedge ratio, standardized spread and ADF test for one pair.
pub fn analyze_pair(
    table: &PriceTable,
    pair: &Pair,
    window: &DateWindow,
    adf: &AdfOptions,
) -> Result<PairAnalysis, AnalysisError> {
    let spread = compute_pair_spread(table, pair, window)?;
    let adf = adf_test(&spread.zscore, adf)?;
    Ok(PairAnalysis { spread, adf })
}

fn log_outcome(pair: &Pair, result: &Result<PairAnalysis, AnalysisError>) {
    match result {
        Ok(a) => info!(
            pair = %pair,
            hedge_ratio = a.hedge_ratio(),
            adf = a.adf.statistic,
            p_value = a.adf.p_value,
            lag = a.adf.used_lag,
            "pair analyzed"
        ),
        Err(err) => warn!(pair = %pair, error = %err, "pair analysis failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::{cointegrated_pair, independent_walks, price_table};
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn synthetic_table() -> PriceTable {
        let mut rng = StdRng::seed_from_u64(21);
        let (a, b) = cointegrated_pair(&mut rng, 400, 1.25, 1.0);
        let (c, d) = independent_walks(&mut rng, 400);
        price_table(
            NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            vec![
                ("A".to_string(), a),
                ("B".to_string(), b),
                ("C".to_string(), c),
                ("D".to_string(), d),
                ("FLAT".to_string(), vec![50.0; 400]),
            ],
        )
    }

    #[test]
    fn recovers_hedge_ratio_and_rejects_unit_root() {
        let table = synthetic_table();
        let a = analyze_pair(&table, &Pair::new("A", "B"), &DateWindow::default(), &AdfOptions::default()).unwrap();
        assert!((a.hedge_ratio() - 1.25).abs() < 0.02, "h = {}", a.hedge_ratio());
        assert!(a.adf.p_value < 0.05, "p = {}", a.adf.p_value);
    }

    #[test]
    fn rerun_is_bit_identical() {
        let table = synthetic_table();
        let pairs = [Pair::new("A", "B"), Pair::new("C", "D")];
        for pair in &pairs {
            let x = analyze_pair(&table, pair, &DateWindow::default(), &AdfOptions::default()).unwrap();
            let y = analyze_pair(&table, pair, &DateWindow::default(), &AdfOptions::default()).unwrap();
            assert_eq!(x.hedge_ratio().to_bits(), y.hedge_ratio().to_bits());
            assert_eq!(x.adf.statistic.to_bits(), y.adf.statistic.to_bits());
            assert_eq!(x.adf.p_value.to_bits(), y.adf.p_value.to_bits());
        }
    }

    #[test]
    fn failing_pair_does_not_abort_others() {
        let table = synthetic_table();
        let pairs = [Pair::new("A", "FLAT"), Pair::new("A", "B"), Pair::new("A", "MISSING")];
        let out: Vec<_> = pairs
            .iter()
            .map(|p| analyze_pair(&table, p, &DateWindow::default(), &AdfOptions::default()))
            .collect();

        assert!(matches!(out[0], Err(AnalysisError::DegenerateRegression(_))));
        assert!(out[1].is_ok());
        assert!(matches!(out[2], Err(AnalysisError::UnknownTicker(_))));
    }

    #[test]
    fn short_window_is_insufficient_for_adf() {
        let table = synthetic_table();
        let window = DateWindow::new(None, Some(table.dates[2]));
        let err = analyze_pair(&table, &Pair::new("A", "B"), &window, &AdfOptions::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { .. }), "{err:?}");
    }
}
