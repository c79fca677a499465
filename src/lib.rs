//! `pairs-coint` library crate.
//!
//! The binary (`coint`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the statistics (`coint`, `math`) are reusable outside the CLI
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod coint;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
