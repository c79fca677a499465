//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - pairs, date windows and aligned price tables (`Pair`, `DateWindow`, `PriceTable`)
//! - ADF configuration and outputs (`AdfOptions`, `AdfResult`, `CriticalValues`)
//! - per-pair outputs (`PairSpread`, `PairAnalysis`) and run configuration

pub mod types;

pub use types::*;
