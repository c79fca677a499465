//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the spread/ADF computations
//! - exported to JSON/CSV
//! - compared across runs (everything here is deterministic)

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// An ordered pair of tickers analyzed jointly.
///
/// The dependent leg is the regression response, the independent leg the sole
/// regressor: `spread = dependent - h * independent`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub dependent: String,
    pub independent: String,
}

impl Pair {
    pub fn new(dependent: impl Into<String>, independent: impl Into<String>) -> Self {
        Self {
            dependent: dependent.into(),
            independent: independent.into(),
        }
    }

    /// The pairs analyzed when none are given on the command line.
    pub fn defaults() -> Vec<Pair> {
        vec![
            Pair::new("KO", "PEP"),
            Pair::new("XOM", "CVX"),
            Pair::new("GLD", "GDX"),
        ]
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.dependent, self.independent)
    }
}

/// Parses `A:B` (also accepts `A/B` and `A,B`).
impl FromStr for Pair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((a, b)) = s.split_once([':', '/', ',']) else {
            return Err(format!("Invalid pair '{s}'. Expected DEPENDENT:INDEPENDENT (e.g. KO:PEP)."));
        };
        let (a, b) = (a.trim().to_ascii_uppercase(), b.trim().to_ascii_uppercase());
        if a.is_empty() || b.is_empty() {
            return Err(format!("Invalid pair '{s}': both tickers are required."));
        }
        if a == b {
            return Err(format!("Invalid pair '{s}': a ticker cannot be paired with itself."));
        }
        Ok(Pair::new(a, b))
    }
}

/// Inclusive date range used for hedge-ratio estimation.
///
/// Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::error::fmt_window(self.start, self.end))
    }
}

/// One security's adjusted-close history, sorted by date with no duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub ticker: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Adjusted-close prices for several tickers on a shared date index.
///
/// Invariants:
/// - `dates` strictly increasing
/// - every column has `dates.len()` finite values
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    pub dates: Vec<NaiveDate>,
    pub tickers: Vec<String>,
    pub columns: Vec<Vec<f64>>,
}

impl PriceTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, ticker: &str) -> Result<&[f64], AnalysisError> {
        self.tickers
            .iter()
            .position(|t| t.eq_ignore_ascii_case(ticker))
            .map(|idx| self.columns[idx].as_slice())
            .ok_or_else(|| AnalysisError::UnknownTicker(ticker.to_string()))
    }

    /// Restrict the table to the dates inside `window`.
    pub fn window(&self, window: &DateWindow) -> PriceTable {
        let keep: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(_, d)| window.contains(**d))
            .map(|(i, _)| i)
            .collect();

        PriceTable {
            dates: keep.iter().map(|&i| self.dates[i]).collect(),
            tickers: self.tickers.clone(),
            columns: self
                .columns
                .iter()
                .map(|col| keep.iter().map(|&i| col[i]).collect())
                .collect(),
        }
    }
}

/// How the ADF test picks its number of lagged differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AutoLag {
    /// Minimize the Akaike information criterion.
    Aic,
    /// Minimize the Bayesian information criterion.
    Bic,
    /// Start at the max lag and drop lags until the last one has |t| >= 1.645.
    TStat,
    /// Use the max lag as given.
    None,
}

/// Options for the augmented Dickey-Fuller test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdfOptions {
    /// Largest lag considered. `None` uses `ceil(12 * (n/100)^(1/4))`.
    pub max_lag: Option<usize>,
    pub autolag: AutoLag,
}

impl Default for AdfOptions {
    fn default() -> Self {
        Self {
            max_lag: None,
            autolag: AutoLag::Aic,
        }
    }
}

/// Significance levels with tabulated critical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Significance {
    OnePct,
    FivePct,
    TenPct,
}

impl Significance {
    pub const ALL: [Significance; 3] = [Significance::OnePct, Significance::FivePct, Significance::TenPct];

    pub fn label(self) -> &'static str {
        match self {
            Significance::OnePct => "1%",
            Significance::FivePct => "5%",
            Significance::TenPct => "10%",
        }
    }
}

/// ADF critical values at 1%, 5% and 10%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    #[serde(rename = "1%")]
    pub one_pct: f64,
    #[serde(rename = "5%")]
    pub five_pct: f64,
    #[serde(rename = "10%")]
    pub ten_pct: f64,
}

impl CriticalValues {
    pub fn at(&self, level: Significance) -> f64 {
        match level {
            Significance::OnePct => self.one_pct,
            Significance::FivePct => self.five_pct,
            Significance::TenPct => self.ten_pct,
        }
    }
}

/// Output of the augmented Dickey-Fuller test.
///
/// This is decision support, not a decision: callers compare `statistic` or
/// `p_value` against the threshold they care about.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    pub statistic: f64,
    pub p_value: f64,
    /// Number of lagged differences in the final regression.
    pub used_lag: usize,
    /// Observations in the final regression.
    pub n_obs: usize,
    /// Largest lag considered during selection.
    pub max_lag: usize,
    /// Best information criterion found during lag selection (AIC/BIC only).
    pub ic_best: Option<f64>,
    pub critical_values: CriticalValues,
}

impl AdfResult {
    /// `true` when the statistic is below (more negative than) the critical value,
    /// i.e. the unit-root null is rejected at `level`.
    pub fn is_stationary_at(&self, level: Significance) -> bool {
        self.statistic < self.critical_values.at(level)
    }
}

/// Spread of one pair over the estimation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSpread {
    pub pair: Pair,
    pub dates: Vec<NaiveDate>,
    pub hedge_ratio: f64,
    /// `dependent - hedge_ratio * independent`.
    pub spread: Vec<f64>,
    /// Spread standardized to zero mean and unit (sample) standard deviation.
    pub zscore: Vec<f64>,
}

/// Everything computed for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairAnalysis {
    pub spread: PairSpread,
    pub adf: AdfResult,
}

impl PairAnalysis {
    pub fn pair(&self) -> &Pair {
        &self.spread.pair
    }

    pub fn hedge_ratio(&self) -> f64 {
        self.spread.hedge_ratio
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Directory holding one `<TICKER>.csv` per security.
    pub data_dir: PathBuf,
    pub pairs: Vec<Pair>,
    pub window: DateWindow,
    pub adf: AdfOptions,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    pub export_spreads: Option<PathBuf>,
}

impl AnalysisConfig {
    /// Every ticker referenced by the configured pairs, in first-seen order.
    pub fn tickers(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for pair in &self.pairs {
            for t in [&pair.dependent, &pair.independent] {
                if !out.contains(t) {
                    out.push(t.clone());
                }
            }
        }
        out
    }
}

/// Settings for the Monte Carlo check of the test procedure.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub trials: usize,
    pub len: usize,
    pub hedge_ratio: f64,
    pub noise_sd: f64,
    pub seed: u64,
    pub adf: AdfOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn pair_parses_common_separators() {
        assert_eq!("ko:pep".parse::<Pair>().unwrap(), Pair::new("KO", "PEP"));
        assert_eq!("GLD/GDX".parse::<Pair>().unwrap(), Pair::new("GLD", "GDX"));
        assert!("KO".parse::<Pair>().is_err());
        assert!("KO:KO".parse::<Pair>().is_err());
        assert!(":PEP".parse::<Pair>().is_err());
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let w = DateWindow::new(Some(d(2020, 1, 2)), Some(d(2020, 1, 3)));
        assert!(!w.contains(d(2020, 1, 1)));
        assert!(w.contains(d(2020, 1, 2)));
        assert!(w.contains(d(2020, 1, 3)));
        assert!(!w.contains(d(2020, 1, 4)));
        assert!(DateWindow::default().contains(d(1990, 1, 1)));
    }

    #[test]
    fn table_window_keeps_columns_aligned() {
        let table = PriceTable {
            dates: vec![d(2020, 1, 1), d(2020, 1, 2), d(2020, 1, 3)],
            tickers: vec!["A".to_string(), "B".to_string()],
            columns: vec![vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]],
        };
        let sub = table.window(&DateWindow::new(Some(d(2020, 1, 2)), None));
        assert_eq!(sub.dates, vec![d(2020, 1, 2), d(2020, 1, 3)]);
        assert_eq!(sub.column("a").unwrap(), &[2.0, 3.0]);
        assert_eq!(sub.column("B").unwrap(), &[20.0, 30.0]);
        assert!(matches!(sub.column("C"), Err(AnalysisError::UnknownTicker(_))));
    }

    #[test]
    fn tickers_are_deduplicated_in_order() {
        let config = AnalysisConfig {
            data_dir: PathBuf::from("data"),
            pairs: vec![Pair::new("KO", "PEP"), Pair::new("PEP", "XOM")],
            window: DateWindow::default(),
            adf: AdfOptions::default(),
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_results: None,
            export_json: None,
            export_spreads: None,
        };
        assert_eq!(config.tickers(), vec!["KO", "PEP", "XOM"]);
    }
}
