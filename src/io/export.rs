//! Export per-pair results and spreads.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts:
//! - results CSV: one row per configured pair, failed pairs carry their error
//! - results JSON: same content plus run settings, nested ADF output
//! - spreads CSV: long format `date,pair,spread,zscore`

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::PairOutcome;
use crate::domain::{AdfResult, AnalysisConfig, AutoLag, DateWindow, Pair, Significance};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ResultRow {
    pair: String,
    dependent: String,
    independent: String,
    status: &'static str,
    n_obs: Option<usize>,
    hedge_ratio: Option<f64>,
    adf_statistic: Option<f64>,
    p_value: Option<f64>,
    used_lag: Option<usize>,
    crit_1pct: Option<f64>,
    crit_5pct: Option<f64>,
    crit_10pct: Option<f64>,
    cointegrated_5pct: Option<bool>,
    error: Option<String>,
}

impl ResultRow {
    fn from_outcome(o: &PairOutcome) -> Self {
        let mut row = ResultRow {
            pair: o.pair.to_string(),
            dependent: o.pair.dependent.clone(),
            independent: o.pair.independent.clone(),
            status: "ok",
            n_obs: None,
            hedge_ratio: None,
            adf_statistic: None,
            p_value: None,
            used_lag: None,
            crit_1pct: None,
            crit_5pct: None,
            crit_10pct: None,
            cointegrated_5pct: None,
            error: None,
        };
        match &o.result {
            Ok(a) => {
                row.n_obs = Some(a.spread.zscore.len());
                row.hedge_ratio = Some(a.hedge_ratio());
                row.adf_statistic = Some(a.adf.statistic);
                row.p_value = Some(a.adf.p_value);
                row.used_lag = Some(a.adf.used_lag);
                row.crit_1pct = Some(a.adf.critical_values.one_pct);
                row.crit_5pct = Some(a.adf.critical_values.five_pct);
                row.crit_10pct = Some(a.adf.critical_values.ten_pct);
                row.cointegrated_5pct = Some(a.adf.is_stationary_at(Significance::FivePct));
            }
            Err(err) => {
                row.status = "failed";
                row.error = Some(err.to_string());
            }
        }
        row
    }
}

/// Write one row per pair to a CSV file.
pub fn write_results_csv(path: &Path, outcomes: &[PairOutcome]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    for o in outcomes {
        wtr.serialize(ResultRow::from_outcome(o))
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV '{}': {e}", path.display())))?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct ResultsFile<'a> {
    data_dir: String,
    window: &'a DateWindow,
    autolag: AutoLag,
    max_lag: Option<usize>,
    pairs: Vec<PairJson<'a>>,
}

#[derive(Debug, Serialize)]
struct PairJson<'a> {
    pair: &'a Pair,
    #[serde(skip_serializing_if = "Option::is_none")]
    hedge_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    n_obs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adf: Option<&'a AdfResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Write per-pair results (hedge ratio + full ADF output) to JSON.
pub fn write_results_json(path: &Path, outcomes: &[PairOutcome], config: &AnalysisConfig) -> Result<(), AppError> {
    let pairs = outcomes
        .iter()
        .map(|o| match &o.result {
            Ok(a) => PairJson {
                pair: &o.pair,
                hedge_ratio: Some(a.hedge_ratio()),
                n_obs: Some(a.spread.zscore.len()),
                adf: Some(&a.adf),
                error: None,
            },
            Err(err) => PairJson {
                pair: &o.pair,
                hedge_ratio: None,
                n_obs: None,
                adf: None,
                error: Some(err.to_string()),
            },
        })
        .collect();

    let doc = ResultsFile {
        data_dir: config.data_dir.display().to_string(),
        window: &config.window,
        autolag: config.adf.autolag,
        max_lag: config.adf.max_lag,
        pairs,
    };

    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON '{}': {e}", path.display())))?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct SpreadRow<'a> {
    date: String,
    pair: &'a str,
    spread: f64,
    zscore: f64,
}

/// Write raw and standardized spreads of every analyzed pair (long format).
pub fn write_spreads_csv(path: &Path, outcomes: &[PairOutcome]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create spreads CSV '{}': {e}", path.display())))?;
    for a in outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
        let label = a.pair().to_string();
        let s = &a.spread;
        for ((date, spread), zscore) in s.dates.iter().zip(&s.spread).zip(&s.zscore) {
            wtr.serialize(SpreadRow {
                date: date.to_string(),
                pair: &label,
                spread: *spread,
                zscore: *zscore,
            })
            .map_err(|e| AppError::new(2, format!("Failed to write spreads CSV row: {e}")))?;
        }
    }
    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush spreads CSV '{}': {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::{AdfOptions, CriticalValues, PairAnalysis, PairSpread};
    use crate::error::AnalysisError;

    fn outcomes() -> Vec<PairOutcome> {
        let d0 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let ok = PairAnalysis {
            spread: PairSpread {
                pair: Pair::new("KO", "PEP"),
                dates: vec![d0, d0.succ_opt().unwrap()],
                hedge_ratio: 0.25,
                spread: vec![1.5, -1.5],
                zscore: vec![0.7071, -0.7071],
            },
            adf: AdfResult {
                statistic: -3.1,
                p_value: 0.026,
                used_lag: 0,
                n_obs: 1,
                max_lag: 0,
                ic_best: None,
                critical_values: CriticalValues {
                    one_pct: -3.5,
                    five_pct: -2.9,
                    ten_pct: -2.6,
                },
            },
        };
        vec![
            PairOutcome {
                pair: Pair::new("KO", "PEP"),
                prices: None,
                result: Ok(ok),
            },
            PairOutcome {
                pair: Pair::new("XOM", "CVX"),
                prices: None,
                result: Err(AnalysisError::UnknownTicker("CVX".to_string())),
            },
        ]
    }

    #[test]
    fn results_csv_has_row_per_pair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_results_csv(&path, &outcomes()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("pair,dependent,independent,status,n_obs,hedge_ratio"));
        assert!(lines[1].starts_with("KO/PEP,KO,PEP,ok,2,0.25,-3.1,0.026,0,-3.5,-2.9,-2.6,true,"));
        assert!(lines[2].starts_with("XOM/CVX,XOM,CVX,failed,,,,,,,,,,"));
        assert!(lines[2].contains("CVX is not present"));
    }

    #[test]
    fn results_json_nests_adf_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let config = AnalysisConfig {
            data_dir: "data".into(),
            pairs: Pair::defaults(),
            window: DateWindow::default(),
            adf: AdfOptions::default(),
            plot: false,
            plot_width: 100,
            plot_height: 20,
            export_results: None,
            export_json: Some(path.clone()),
            export_spreads: None,
        };
        write_results_json(&path, &outcomes(), &config).unwrap();

        let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["autolag"], "aic");
        assert_eq!(v["pairs"][0]["pair"]["dependent"], "KO");
        assert_eq!(v["pairs"][0]["adf"]["critical_values"]["5%"], -2.9);
        assert!(v["pairs"][1].get("adf").is_none());
        assert!(v["pairs"][1]["error"].as_str().unwrap().contains("CVX"));
    }

    #[test]
    fn spreads_csv_skips_failed_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spreads.csv");
        write_spreads_csv(&path, &outcomes()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "date,pair,spread,zscore\n2024-03-01,KO/PEP,1.5,0.7071\n2024-03-02,KO/PEP,-1.5,-0.7071\n"
        );
    }
}
