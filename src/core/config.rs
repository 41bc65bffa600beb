//! Tool configuration loaded from `config.toml`.
//!
//! Every field is optional; an absent file means the stock oref0 tool names,
//! the `US/Eastern` time zone, and no HTTP timeout.
//!
//! ```toml
//! timezone = "Europe/Berlin"
//! http_timeout_secs = 120
//!
//! [tools]
//! prep = "/usr/local/bin/oref0-autotune-prep"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::constants;
use crate::error::{AutotuneError, Result};

/// Names of the external executables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolNames {
    pub prep: String,
    pub core: String,
    pub export: String,
    pub report: String,
}

impl Default for ToolNames {
    fn default() -> Self {
        Self {
            prep: constants::DEFAULT_PREP_TOOL.to_string(),
            core: constants::DEFAULT_CORE_TOOL.to_string(),
            export: constants::DEFAULT_EXPORT_TOOL.to_string(),
            report: constants::DEFAULT_REPORT_TOOL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    timezone: String,
    http_timeout_secs: Option<u64>,
    tools: ToolNames,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            timezone: constants::DEFAULT_TIMEZONE.to_string(),
            http_timeout_secs: None,
            tools: ToolNames::default(),
        }
    }
}

/// Validated tool configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolConfig {
    /// Zone the treatment window and entry days are computed in.
    pub timezone: Tz,
    /// Request timeout; `None` waits indefinitely.
    pub http_timeout: Option<Duration>,
    pub tools: ToolNames,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::US::Eastern,
            http_timeout: None,
            tools: ToolNames::default(),
        }
    }
}

impl ToolConfig {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// when present and built-in defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or any file is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.is_file() => p,
                _ => {
                    tracing::debug!("no config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = fs::read_to_string(&path).map_err(|e| AutotuneError::io(&path, e))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`AutotuneError::Config`] for malformed TOML, unknown keys, or an
    /// unknown time zone.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| AutotuneError::Config {
            context: "config.toml",
            details: e.to_string(),
        })?;

        let timezone = raw
            .timezone
            .parse::<Tz>()
            .map_err(|e| AutotuneError::Config {
                context: "timezone",
                details: format!("{}: {e}", raw.timezone),
            })?;

        Ok(Self {
            timezone,
            http_timeout: raw.http_timeout_secs.map(Duration::from_secs),
            tools: raw.tools,
        })
    }
}

/// `<config_dir>/ns-autotune/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(constants::APP_NAME).join(constants::CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(ToolConfig::from_toml_str("").unwrap(), ToolConfig::default());
    }

    #[test]
    fn test_defaults() {
        let config = ToolConfig::default();
        assert_eq!(config.timezone, chrono_tz::US::Eastern);
        assert_eq!(config.http_timeout, None);
        assert_eq!(config.tools.prep, "oref0-autotune-prep");
        assert_eq!(config.tools.core, "oref0-autotune-core");
        assert_eq!(config.tools.export, "oref0-autotune-export-to-xlsx");
        assert_eq!(config.tools.report, "oref0-autotune-recommends-report");
    }

    #[test]
    fn test_partial_override() {
        let config = ToolConfig::from_toml_str(
            r#"
timezone = "Europe/Berlin"
http_timeout_secs = 90

[tools]
core = "/opt/oref0/bin/oref0-autotune-core"
"#,
        )
        .unwrap();
        assert_eq!(config.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(config.http_timeout, Some(Duration::from_secs(90)));
        assert_eq!(config.tools.core, "/opt/oref0/bin/oref0-autotune-core");
        assert_eq!(config.tools.prep, "oref0-autotune-prep");
    }

    #[test]
    fn test_unknown_timezone() {
        let err = ToolConfig::from_toml_str(r#"timezone = "Mars/Olympus""#).unwrap_err();
        assert!(matches!(err, AutotuneError::Config { context: "timezone", .. }));
    }

    #[test]
    fn test_unknown_key() {
        assert!(ToolConfig::from_toml_str("api_secret = \"x\"").is_err());
    }

    #[test]
    fn test_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ToolConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, AutotuneError::FileNotFound { .. }));
    }

    #[test]
    fn test_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[tools]\nreport = \"my-report\"\n").unwrap();
        let config = ToolConfig::load(Some(&path)).unwrap();
        assert_eq!(config.tools.report, "my-report");
    }
}
