//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use url::Url;

use crate::constants;

/// ns-autotune - run oref0 autotune against Nightscout history
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// OpenAPS directory; must already contain `settings/` and `autotune/`
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: String,

    /// Nightscout site URL
    #[arg(short = 'n', long = "ns-host", value_name = "NIGHTSCOUT_HOST", value_parser = parse_host)]
    pub ns_host: Url,

    /// First day of data (YYYY-MM-DD)
    #[arg(short = 's', long = "start-date", value_name = "YYYY-MM-DD", value_parser = parse_date)]
    pub start_date: NaiveDate,

    /// Day after the last day of data (YYYY-MM-DD); defaults to today
    #[arg(short = 'e', long = "end-date", value_name = "YYYY-MM-DD", value_parser = parse_date)]
    pub end_date: Option<NaiveDate>,

    /// Number of passes over the date range; defaults to 1
    #[arg(short = 'r', long = "runs", value_name = "NUMBER_OF_RUNS")]
    pub runs: Option<u32>,

    /// Export results to this spreadsheet file
    #[arg(short = 'x', long = "xlsx", value_name = "EXPORT_EXCEL")]
    pub xlsx: Option<PathBuf>,

    /// Print the recommendations report when done
    #[arg(
        short = 'l',
        long = "log",
        value_name = "TERMINAL_LOGGING",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub log: bool,

    /// Configuration file naming the external tools and time zone
    #[arg(short = 'c', long = "config", env = "NS_AUTOTUNE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Fail on HTTP error statuses, failed tools and malformed tuned profiles
    #[arg(long)]
    pub strict: bool,

    /// Also download the Nightscout profile document
    #[arg(long = "ns-profile")]
    pub ns_profile: bool,

    /// Debug-level logging
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Errors only
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl Args {
    /// Log filter used when `RUST_LOG` is not set.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns a message suitable for clap's usage output when the date is malformed.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, constants::DATE_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DD, got '{s}': {e}"))
}

/// Parses the Nightscout site URL.
///
/// # Errors
///
/// Returns a message when the value is not an absolute http(s) URL.
pub fn parse_host(s: &str) -> Result<Url, String> {
    let url = Url::parse(s.trim()).map_err(|e| format!("invalid URL '{s}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported URL scheme '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 7] = [
        "ns-autotune",
        "--dir",
        "~/myopenaps",
        "--ns-host",
        "https://example.herokuapp.com",
        "--start-date",
        "2024-01-01",
    ];

    #[test]
    fn test_required_only() {
        let args = Args::try_parse_from(REQUIRED).unwrap();
        assert_eq!(args.dir, "~/myopenaps");
        assert_eq!(args.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(args.end_date, None);
        assert_eq!(args.runs, None);
        assert!(args.log);
        assert!(!args.strict);
        assert_eq!(args.log_level(), "info");
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "ns-autotune",
            "-d",
            "/oa",
            "-n",
            "http://localhost:1337",
            "-s",
            "2024-01-01",
            "-e",
            "2024-01-08",
            "-r",
            "3",
            "-x",
            "out.xlsx",
            "-l",
            "false",
        ])
        .unwrap();
        assert_eq!(args.end_date, NaiveDate::from_ymd_opt(2024, 1, 8));
        assert_eq!(args.runs, Some(3));
        assert_eq!(args.xlsx, Some(PathBuf::from("out.xlsx")));
        assert!(!args.log);
    }

    #[test]
    fn test_malformed_start_date_rejected() {
        let mut argv = REQUIRED.to_vec();
        argv[6] = "01/02/2024";
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_malformed_end_date_rejected() {
        let mut argv = REQUIRED.to_vec();
        argv.extend(["--end-date", "2024-02-30"]);
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_missing_host_rejected() {
        assert!(Args::try_parse_from(["ns-autotune", "-d", "/oa", "-s", "2024-01-01"]).is_err());
    }

    #[test]
    fn test_parse_host_scheme() {
        assert!(parse_host("https://ns.example.org").is_ok());
        assert!(parse_host("ftp://ns.example.org").is_err());
        assert!(parse_host("not a url").is_err());
    }

    #[test]
    fn test_log_accepts_boolish_values() {
        for (value, expected) in [("yes", true), ("0", false), ("off", false), ("TRUE", true)] {
            let mut argv = REQUIRED.to_vec();
            argv.extend(["--log", value]);
            assert_eq!(Args::try_parse_from(argv).unwrap().log, expected, "{value}");
        }
    }

    #[test]
    fn test_verbosity() {
        let mut argv = REQUIRED.to_vec();
        argv.push("-v");
        assert_eq!(Args::try_parse_from(argv).unwrap().log_level(), "debug");

        let mut argv = REQUIRED.to_vec();
        argv.push("-q");
        assert_eq!(Args::try_parse_from(argv).unwrap().log_level(), "error");
    }
}
