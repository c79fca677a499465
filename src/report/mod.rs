//! Formatted terminal output.

mod format;

pub use format::*;
