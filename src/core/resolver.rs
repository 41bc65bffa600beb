//! Turns parsed arguments into a fully defaulted run configuration.

use std::path::PathBuf;

use chrono::NaiveDate;
use url::Url;

use crate::cli::args::Args;
use crate::utils;

/// Source of "today" for the default end date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// The local wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Everything one autotune run needs to know, fixed before any work starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// OpenAPS directory, with `~` expanded.
    pub base_dir: PathBuf,
    pub ns_host: Url,
    pub start_date: NaiveDate,
    /// Exclusive end of the date range.
    pub end_date: NaiveDate,
    /// Always at least 1.
    pub runs: u32,
    /// Spreadsheet export target; `None` skips the export.
    pub xlsx: Option<PathBuf>,
    /// Print the recommendations report at the end.
    pub report: bool,
    pub strict: bool,
    pub fetch_ns_profile: bool,
}

impl RunConfig {
    /// Applies defaults: end date is today per `clock`, and a missing or zero
    /// run count becomes 1.
    pub fn resolve(args: &Args, clock: &dyn Clock) -> Self {
        Self {
            base_dir: utils::expand_home(&args.dir),
            ns_host: args.ns_host.clone(),
            start_date: args.start_date,
            end_date: args.end_date.unwrap_or_else(|| clock.today()),
            runs: args.runs.filter(|&n| n > 0).unwrap_or(1),
            xlsx: args.xlsx.clone(),
            report: args.log,
            strict: args.strict,
            fetch_ns_profile: args.ns_profile,
        }
    }
}
