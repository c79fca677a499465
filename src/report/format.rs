//! Formatted terminal output for analysis and simulation runs.
//!
//! We keep formatting code in one place so:
//! - the statistics code stays clean and testable
//! - output changes are localized (golden tests below)

use crate::app::pipeline::{PairOutcome, RunOutput};
use crate::app::simulation::SimulationSummary;
use crate::domain::{AnalysisConfig, AutoLag, Significance, SimulationConfig};

/// Format the run header (inputs, alignment, ADF settings).
pub fn format_run_summary(run: &RunOutput, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str("=== coint - Pairs Cointegration Screen (OLS hedge + ADF) ===\n");
    out.push_str(&format!("Data dir: {}\n", config.data_dir.display()));
    out.push_str(&format!("Window: {}\n", config.window));

    let loaded: Vec<&str> = run.loaded.iter().map(|s| s.ticker.as_str()).collect();
    out.push_str(&format!(
        "Loaded: {}/{} tickers [{}]\n",
        loaded.len(),
        run.tickers.len(),
        loaded.join(",")
    ));

    let max_lag = config
        .adf
        .max_lag
        .map(|m| m.to_string())
        .unwrap_or_else(|| "12*(n/100)^(1/4)".to_string());
    out.push_str(&format!(
        "ADF: constant, autolag={}, maxlag={max_lag}\n",
        autolag_label(config.adf.autolag)
    ));

    let ok = run.successes().count();
    out.push_str(&format!("Pairs: {ok}/{} analyzed\n", run.outcomes.len()));

    out
}

/// One row per pair; failed pairs show their error instead of statistics.
pub fn format_results_table(outcomes: &[PairOutcome]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<12} {:>10} {:>6} {:>9} {:>9} {:>8} {:>8} {:>8} {:>4} {:<6}\n",
            "pair", "hedge", "n", "adf", "p-value", "1%", "5%", "10%", "lag", "coint@5%"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<12} {:-<10} {:-<6} {:-<9} {:-<9} {:-<8} {:-<8} {:-<8} {:-<4} {:-<8}\n",
            "", "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for o in outcomes {
        let label = truncate(&o.pair.to_string(), 12);
        match &o.result {
            Ok(a) => {
                let cv = &a.adf.critical_values;
                let coint = if a.adf.is_stationary_at(Significance::FivePct) { "yes" } else { "no" };
                out.push_str(
                    format!(
                        "{label:<12} {:>10.4} {:>6} {:>9.4} {:>9} {:>8.4} {:>8.4} {:>8.4} {:>4} {coint:<6}\n",
                        a.hedge_ratio(),
                        a.spread.zscore.len(),
                        a.adf.statistic,
                        fmt_p(a.adf.p_value),
                        cv.one_pct,
                        cv.five_pct,
                        cv.ten_pct,
                        a.adf.used_lag,
                    )
                    .trim_end(),
                );
            }
            Err(err) => out.push_str(&format!("{label:<12} FAILED: {err}")),
        }
        out.push('\n');
    }

    out
}

/// Format the Monte Carlo summary.
pub fn format_simulation_summary(summary: &SimulationSummary, config: &SimulationConfig) -> String {
    let mut out = String::new();
    out.push_str("=== coint - ADF procedure check (simulated) ===\n");
    out.push_str(&format!(
        "Trials: {} per scenario | len={} | hedge={} | noise_sd={} | seed={} | autolag={}\n",
        summary.trials,
        summary.len,
        summary.hedge_ratio,
        config.noise_sd,
        config.seed,
        autolag_label(config.adf.autolag)
    ));

    out.push_str("\nCointegrated pairs (A = h*B + noise):\n");
    out.push_str(&format!(
        "- rejected unit root at 5%: {}/{} ({:.1}%)\n",
        summary.coint_rejected,
        summary.trials,
        100.0 * summary.power()
    ));
    out.push_str(&format!(
        "- hedge ratio |error|: mean={:.5} max={:.5}\n",
        summary.mean_abs_hedge_error, summary.max_abs_hedge_error
    ));
    if summary.coint_failed > 0 {
        out.push_str(&format!("- failed trials: {}\n", summary.coint_failed));
    }

    out.push_str("\nIndependent random walks:\n");
    out.push_str(&format!(
        "- kept unit root (p > 10%): {}/{}\n",
        summary.walks_kept_null, summary.trials
    ));
    out.push_str(&format!(
        "- rejected at 5%: {}/{} ({:.1}%)\n",
        summary.walks_rejected,
        summary.trials,
        100.0 * summary.false_rejection_rate()
    ));
    if summary.walks_failed > 0 {
        out.push_str(&format!("- failed trials: {}\n", summary.walks_failed));
    }

    out
}

fn autolag_label(autolag: AutoLag) -> &'static str {
    match autolag {
        AutoLag::Aic => "AIC",
        AutoLag::Bic => "BIC",
        AutoLag::TStat => "t-stat",
        AutoLag::None => "none",
    }
}

fn fmt_p(p: f64) -> String {
    if p < 1e-4 { format!("{p:.2e}") } else { format!("{p:.4}") }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
