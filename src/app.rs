//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the per-pair spread + ADF pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing::warn;

use crate::cli::{AnalyzeArgs, Command, SimulateArgs};
use crate::domain::{AdfOptions, AnalysisConfig, DateWindow, Pair, SimulationConfig};
use crate::error::AppError;

pub mod pipeline;
pub mod simulation;

/// Entry point for the `coint` binary.
pub fn run() -> Result<(), AppError> {
    // `coint` and `coint --pair KO:PEP` behave like `coint analyze ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::init(cli.verbose);

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args)?;
    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));
    println!("{}", crate::report::format_results_table(&run.outcomes));

    if config.plot {
        for outcome in &run.outcomes {
            let (Ok(analysis), Some(prices)) = (&outcome.result, &outcome.prices) else {
                continue;
            };
            // Spreads are built over the window, so plot the prices over the same dates.
            let sub = prices.window(&config.window);
            let a = sub.column(&analysis.pair().dependent)?;
            let b = sub.column(&analysis.pair().independent)?;
            println!(
                "{}",
                crate::plot::render_price_pair(&analysis.spread, a, b, config.plot_width, config.plot_height)
            );
            println!(
                "{}",
                crate::plot::render_spread(&analysis.spread, config.plot_width, config.plot_height)
            );
        }
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.outcomes)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_results_json(path, &run.outcomes, &config)?;
    }
    if let Some(path) = &config.export_spreads {
        crate::io::export::write_spreads_csv(path, &run.outcomes)?;
    }

    if run.successes().next().is_none() {
        if let Some(err) = run.first_failure() {
            warn!("no pair could be analyzed");
            return Err(err.clone().into());
        }
    }
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = simulation_config_from_args(&args);
    let summary = simulation::run_simulation(&config)?;
    println!("{}", crate::report::format_simulation_summary(&summary, &config));
    Ok(())
}

pub fn analysis_config_from_args(args: &AnalyzeArgs) -> Result<AnalysisConfig, AppError> {
    if let (Some(start), Some(end)) = (args.start, args.end) {
        if start > end {
            return Err(AppError::new(2, format!("--start {start} is after --end {end}.")));
        }
    }
    if args.width < 10 || args.height < 5 {
        return Err(AppError::new(2, "Plot must be at least 10 columns by 5 rows."));
    }

    let pairs = if args.pairs.is_empty() {
        Pair::defaults()
    } else {
        args.pairs.clone()
    };

    Ok(AnalysisConfig {
        data_dir: args.data_dir.clone(),
        pairs,
        window: DateWindow::new(args.start, args.end),
        adf: AdfOptions {
            max_lag: args.max_lag,
            autolag: args.autolag,
        },
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export_results.clone(),
        export_json: args.export_json.clone(),
        export_spreads: args.export_spreads.clone(),
    })
}

pub fn simulation_config_from_args(args: &SimulateArgs) -> SimulationConfig {
    SimulationConfig {
        trials: args.trials,
        len: args.len,
        hedge_ratio: args.hedge,
        noise_sd: args.noise_sd,
        seed: args.seed,
        adf: AdfOptions {
            max_lag: args.max_lag,
            autolag: args.autolag,
        },
    }
}

/// Rewrite argv so `coint` defaults to `coint analyze`.
///
/// Rules:
/// - `coint`                      -> `coint analyze`
/// - `coint --pair KO:PEP ...`    -> `coint analyze --pair KO:PEP ...`
/// - `coint --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("analyze".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "analyze" | "simulate");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "analyze flags".
    if arg1.starts_with('-') {
        argv.insert(1, "analyze".to_string());
        return argv;
    }

    argv
}
