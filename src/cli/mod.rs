//! Command-line parsing for the pairs cointegration screen.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the statistics code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{AutoLag, Pair};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "coint", version, about = "Cointegration screen for security pairs (OLS hedge ratio + ADF)")]
pub struct Cli {
    /// Log debug diagnostics to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load prices, build standardized spreads and ADF-test each pair.
    Analyze(AnalyzeArgs),
    /// Check the test procedure on simulated cointegrated pairs and random walks.
    Simulate(SimulateArgs),
}

/// Options for the analysis run.
#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// Directory with one `<TICKER>.csv` (Date,Open,High,Low,Close,Adj Close,Volume) per ticker.
    #[arg(short = 'd', long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Pair to analyze as DEPENDENT:INDEPENDENT (repeatable). Defaults to KO:PEP, XOM:CVX, GLD:GDX.
    #[arg(short = 'p', long = "pair", value_name = "A:B")]
    pub pairs: Vec<Pair>,

    /// First date of the estimation window (YYYY-MM-DD, inclusive).
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last date of the estimation window (YYYY-MM-DD, inclusive).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// ADF lag selection method.
    #[arg(long, value_enum, default_value_t = AutoLag::Aic)]
    pub autolag: AutoLag,

    /// Largest ADF lag considered (default: 12 * (n/100)^(1/4)).
    #[arg(long)]
    pub max_lag: Option<usize>,

    /// Render ASCII plots of each price pair and its standardized spread.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the per-pair ADF table to CSV.
    #[arg(long)]
    pub export_results: Option<PathBuf>,

    /// Export per-pair results (hedge ratio + full ADF output) to JSON.
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    /// Export raw and standardized spreads to CSV (long format).
    #[arg(long)]
    pub export_spreads: Option<PathBuf>,
}

/// Options for the Monte Carlo check.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Simulated pairs per scenario.
    #[arg(long, default_value_t = 200)]
    pub trials: usize,

    /// Observations per simulated series.
    #[arg(long, default_value_t = 500)]
    pub len: usize,

    /// Hedge ratio of the simulated cointegrated pairs.
    #[arg(long, default_value_t = 1.5)]
    pub hedge: f64,

    /// Standard deviation of the stationary noise around the hedged leg.
    #[arg(long, default_value_t = 1.0)]
    pub noise_sd: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// ADF lag selection method.
    #[arg(long, value_enum, default_value_t = AutoLag::Aic)]
    pub autolag: AutoLag,

    /// Largest ADF lag considered.
    #[arg(long)]
    pub max_lag: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_flags_parse() {
        let cli = Cli::parse_from([
            "coint", "analyze", "--pair", "ko:pep", "-p", "GLD:GDX", "--start", "2019-01-01", "--autolag", "t-stat",
        ]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.pairs, vec![Pair::new("KO", "PEP"), Pair::new("GLD", "GDX")]);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2019, 1, 1));
        assert_eq!(args.end, None);
        assert_eq!(args.autolag, AutoLag::TStat);
        assert_eq!(args.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn bad_pair_is_rejected() {
        assert!(Cli::try_parse_from(["coint", "analyze", "--pair", "KO"]).is_err());
    }
}
