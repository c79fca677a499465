//! Error types.
//!
//! - `AnalysisError` is the typed taxonomy used by the loader, the spread
//!   calculator and the stationarity tester. Every per-pair failure is one of these.
//! - `AppError` is what the binary reports: a message plus a process exit code.
//!
//! Exit codes:
//! - `2`: input/usage errors (missing file, malformed CSV, unknown ticker)
//! - `3`: insufficient data
//! - `4`: degenerate/numerical failures

use std::path::PathBuf;

use chrono::NaiveDate;

/// Failures of the analysis pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Price file not found for {ticker}: '{}'", path.display())]
    FileNotFound { ticker: String, path: PathBuf },

    #[error("Failed to read '{}': {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Ticker {0} is not present in the aligned price table.")]
    UnknownTicker(String),

    #[error("No common dates across {tickers:?} after alignment.")]
    EmptyAlignment { tickers: Vec<String> },

    #[error("Degenerate regression: {0}")]
    DegenerateRegression(String),

    #[error("Insufficient data: need at least {required} observations, got {actual} ({context}).")]
    InsufficientData {
        required: usize,
        actual: usize,
        context: String,
    },
}

impl AnalysisError {
    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    pub fn insufficient(required: usize, actual: usize, context: impl Into<String>) -> Self {
        Self::InsufficientData {
            required,
            actual,
            context: context.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::FileNotFound { .. }
            | Self::Io { .. }
            | Self::Parse { .. }
            | Self::UnknownTicker(_)
            | Self::EmptyAlignment { .. } => 2,
            Self::InsufficientData { .. } => 3,
            Self::DegenerateRegression(_) => 4,
        }
    }
}

/// Convenience for messages that mention a date window.
pub(crate) fn fmt_window(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    let lo = start.map(|d| d.to_string()).unwrap_or_else(|| "..".to_string());
    let hi = end.map(|d| d.to_string()).unwrap_or_else(|| "..".to_string());
    format!("[{lo}, {hi}]")
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        Self::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_errors_map_to_exit_codes() {
        let e = AnalysisError::DegenerateRegression("regressor KO is constant".to_string());
        assert_eq!(AppError::from(e).exit_code(), 4);

        let e = AnalysisError::insufficient(10, 3, "adf");
        let app = AppError::from(e);
        assert_eq!(app.exit_code(), 3);
        assert!(app.to_string().contains("got 3"));

        let e = AnalysisError::parse("data/KO.csv", 7, "Invalid date 'x'");
        assert_eq!(e.exit_code(), 2);
        assert_eq!(e.to_string(), "data/KO.csv:7: Invalid date 'x'");
    }
}
