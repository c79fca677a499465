//! Synthetic data sources.
//!
//! Real prices come from CSV files (`io::ingest`); this module only generates
//! series with known properties for simulations and tests.

pub mod synthetic;

pub use synthetic::*;
