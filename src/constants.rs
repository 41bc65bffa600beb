//! Application-wide constants and configuration values.
//!
//! This module defines the static values used throughout ns-autotune,
//! including file names under the OpenAPS directory, Nightscout API
//! endpoints, default executable names, and terminal messages.

// === Application Metadata ===

/// Application name (from Cargo.toml).
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
/// Current application version (from Cargo.toml).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// === Path Configuration ===

/// Subdirectory holding the user's pump settings.
pub const SETTINGS_DIR_NAME: &str = "settings";
/// Subdirectory holding every autotune input, intermediate and output file.
pub const AUTOTUNE_DIR_NAME: &str = "autotune";
/// Name of the optional configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Pump profile template the whole run is seeded from.
pub const PUMP_PROFILE_TEMPLATE: &str = "pumpprofile.json";
/// Settings profile (`settings/profile.json`).
pub const SETTINGS_PROFILE: &str = "profile.json";
/// Settings autotune baseline (`settings/autotune.json`).
pub const SETTINGS_AUTOTUNE: &str = "autotune.json";

/// Current profile, rewritten after every iteration.
pub const CURRENT_PROFILE: &str = "profile.json";
/// Pump profile snapshot handed to the core tool.
pub const PROFILE_PUMP: &str = "profile.pump.json";
/// Pump profile copy handed to the prep tool.
pub const PREP_PUMP_PROFILE: &str = "pumpprofile.json";
/// Nightscout profile document.
pub const NS_PROFILE: &str = "nightscout.profile.json";
/// Treatments for the whole date range.
pub const NS_TREATMENTS: &str = "ns-treatments.json";
/// Recommendations written by the report tool.
pub const RECOMMENDATIONS_LOG: &str = "autotune_recommendations.log";

/// Date format used in every date-keyed filename and on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// === Nightscout API ===

/// Treatments endpoint, relative to the host.
pub const NS_TREATMENTS_PATH: &str = "/api/v1/treatments.json";
/// Sensor glucose entries endpoint, relative to the host.
pub const NS_ENTRIES_PATH: &str = "/api/v1/entries/sgv.json";
/// Profile endpoint, relative to the host.
pub const NS_PROFILE_PATH: &str = "/api/v1/profile.json";
/// Maximum number of glucose entries requested per day.
pub const NS_ENTRIES_COUNT: u32 = 1500;

/// Local hour the treatment window is anchored to.
pub const TREATMENT_ANCHOR_HOUR: u32 = 20;
/// Hours the treatment window reaches back before the start anchor.
pub const TREATMENT_LOOKBACK_HOURS: i64 = 4;
/// Days the treatment window reaches past the end anchor.
pub const TREATMENT_LOOKAHEAD_DAYS: u64 = 1;
/// Timestamp format for treatment filters (ISO-8601, minute precision).
pub const TREATMENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M%:z";

/// Time zone Nightscout data is interpreted in unless configured otherwise.
pub const DEFAULT_TIMEZONE: &str = "US/Eastern";

// === External Tools ===

/// Prepares one day of glucose data against treatments and the profile.
pub const DEFAULT_PREP_TOOL: &str = "oref0-autotune-prep";
/// Produces a tuned profile from prepared data.
pub const DEFAULT_CORE_TOOL: &str = "oref0-autotune-core";
/// Exports the autotune directory to a spreadsheet.
pub const DEFAULT_EXPORT_TOOL: &str = "oref0-autotune-export-to-xlsx";
/// Writes the recommendations log.
pub const DEFAULT_REPORT_TOOL: &str = "oref0-autotune-recommends-report";
/// Flag naming the output file for the prep and core tools.
pub const TOOL_OUTPUT_FLAG: &str = "--output-file";

// === Messages: CLI Output ===

pub const CLI_MSG_REPORT_HEADER: &str = "Autotune pump profile recommendations:";
pub const CLI_MSG_REPORT_RULE: &str = "---------------------------------------------------------";
pub const CLI_MSG_REPORT_LOG_FILE: &str = "Recommendations Log File: ";
