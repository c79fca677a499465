//! CSV ingest and alignment.
//!
//! Each ticker has one daily OHLCV file:
//!
//! ```text
//! Date,Open,High,Low,Close,Adj Close,Volume
//! 2020-01-02,54.35,54.99,54.09,54.99,48.80,11867700
//! ```
//!
//! We only keep `Date` and `Adj Close`. Alignment is an inner join on dates,
//! followed by dropping any date where some ticker has a missing price.
//!
//! Design goals:
//! - **Strict schema** for the two columns we use (clear errors naming file and line)
//! - **Missing prices are data, not errors**: blank/`null` cells are dropped
//! - **Deterministic behavior**: output order is by date, columns follow input order

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::{PriceSeries, PriceTable};
use crate::error::AnalysisError;

const DATE_COLUMN: &str = "date";
const PRICE_COLUMN: &str = "adj close";

/// Path of a ticker's price file inside `data_dir`.
pub fn price_file_path(data_dir: &Path, ticker: &str) -> PathBuf {
    data_dir.join(format!("{ticker}.csv"))
}

/// Load one ticker's adjusted-close series from a CSV file.
pub fn load_price_series(path: &Path, ticker: &str) -> Result<PriceSeries, AnalysisError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AnalysisError::FileNotFound {
            ticker: ticker.to_string(),
            path: path.to_path_buf(),
        },
        _ => AnalysisError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AnalysisError::parse(path, 1, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = *header_map
        .get(DATE_COLUMN)
        .ok_or_else(|| AnalysisError::parse(path, 1, "Missing required column: `Date`"))?;
    let price_idx = *header_map
        .get(PRICE_COLUMN)
        .ok_or_else(|| AnalysisError::parse(path, 1, "Missing required column: `Adj Close`"))?;

    // (date, price, CSV line); rows with a missing price still take part in
    // the duplicate-date check.
    let mut rows: Vec<(NaiveDate, Option<f64>, usize)> = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header and CSV lines are 1-based.
        let line = idx + 2;

        let record = result.map_err(|e| AnalysisError::parse(path, line, format!("CSV parse error: {e}")))?;

        let raw_date = record
            .get(date_idx)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AnalysisError::parse(path, line, "Missing `Date` value."))?;
        let date = parse_date(raw_date).map_err(|msg| AnalysisError::parse(path, line, msg))?;
        let price = parse_price(record.get(price_idx).unwrap_or(""))
            .map_err(|msg| AnalysisError::parse(path, line, msg))?;

        rows.push((date, price, line));
    }

    // Stable sort keeps file order among equal dates, so `w[1]` is the later row.
    rows.sort_by_key(|(d, _, _)| *d);
    if let Some(w) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(AnalysisError::parse(
            path,
            w[1].2,
            format!("Duplicate date {} (first seen on line {}).", w[1].0, w[0].2),
        ));
    }

    let rows_read = rows.len();
    let points: Vec<(NaiveDate, f64)> = rows.into_iter().filter_map(|(d, p, _)| p.map(|p| (d, p))).collect();
    let missing = rows_read - points.len();

    if missing > 0 {
        warn!(ticker, missing, "dropped rows with missing adjusted close");
    }
    debug!(ticker, rows_read, rows_used = points.len(), path = %path.display(), "loaded price series");

    Ok(PriceSeries {
        ticker: ticker.to_string(),
        points,
    })
}

/// Inner-join several series on their dates.
///
/// The output keeps only dates present in every series. Columns follow the
/// order of `series`.
pub fn align_prices(series: &[PriceSeries]) -> Result<PriceTable, AnalysisError> {
    let tickers: Vec<String> = series.iter().map(|s| s.ticker.clone()).collect();

    let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for (col, s) in series.iter().enumerate() {
        for &(date, price) in &s.points {
            by_date.entry(date).or_insert_with(|| vec![None; series.len()])[col] = Some(price);
        }
    }

    let mut dates = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); series.len()];
    for (date, row) in by_date {
        if row.iter().any(Option::is_none) {
            continue;
        }
        dates.push(date);
        for (col, v) in row.into_iter().flatten().enumerate() {
            columns[col].push(v);
        }
    }

    if dates.is_empty() {
        return Err(AnalysisError::EmptyAlignment { tickers });
    }

    Ok(PriceTable {
        dates,
        tickers,
        columns,
    })
}

/// Load `<data_dir>/<TICKER>.csv` for every ticker and align them.
pub fn load_aligned_prices(data_dir: &Path, tickers: &[String]) -> Result<PriceTable, AnalysisError> {
    let series = tickers
        .iter()
        .map(|t| load_price_series(&price_file_path(data_dir, t), t))
        .collect::<Result<Vec<_>, _>>()?;

    let table = align_prices(&series)?;
    info!(
        tickers = tickers.len(),
        dates = table.len(),
        first = %table.dates[0],
        last = %table.dates[table.len() - 1],
        "aligned price table"
    );
    Ok(table)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.replace('_', " ").to_ascii_lowercase()
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Daily downloads usually carry ISO dates; some add a midnight timestamp.
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
    let s = s.split([' ', 'T']).next().unwrap_or(s);
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, MM/DD/YYYY, YYYY/MM/DD."
    ))
}

/// Cells that mean "no price" rather than a malformed value.
const MISSING_MARKERS: [&str; 10] = ["", "null", "nan", "-nan", "na", "n/a", "#n/a", "#na", "none", "<na>"];

/// `Ok(None)` for a missing-value marker, `Err` for anything else that is not
/// a finite number.
fn parse_price(s: &str) -> Result<Option<f64>, String> {
    if MISSING_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m)) {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("Invalid `Adj Close` value '{s}'.")),
    }
}
