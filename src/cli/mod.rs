//! Command-line interface module.
//!
//! Provides argument parsing and terminal report output.

pub mod args;
pub mod report;
