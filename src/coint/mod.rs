//! Cointegration analysis.
//!
//! Responsibilities:
//!
//! - estimate the hedge ratio and standardized spread of a pair (`spread`)
//! - test the spread for a unit root (`adf`)
//! - map ADF statistics to p-values and critical values (`mackinnon`)

pub mod adf;
pub mod mackinnon;
pub mod spread;

pub use adf::*;
pub use mackinnon::*;
pub use spread::*;
