//! Error types shared by the autotune pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Shared `Result` alias for the crate.
pub type Result<T> = std::result::Result<T, AutotuneError>;

/// Everything that can stop an autotune run.
///
/// Failures of the external tools and non-success HTTP statuses only show up
/// here when strict checking is enabled; otherwise they are logged and the run
/// carries on with whatever output was produced.
#[derive(Debug, Error)]
pub enum AutotuneError {
    #[error("required file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O failure at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("configuration error in {context}: {details}")]
    Config {
        context: &'static str,
        details: String,
    },

    #[error("cannot place {date} {hour}:00 in time zone {timezone}")]
    InvalidTimestamp {
        date: String,
        hour: u32,
        timezone: String,
    },

    #[error("{tool} failed: {details}")]
    ToolFailed { tool: String, details: String },

    #[error("tuned profile {} is not valid JSON: {details}", path.display())]
    InvalidProfile { path: PathBuf, details: String },
}

impl AutotuneError {
    /// Wrap an I/O error, turning `NotFound` into [`AutotuneError::FileNotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}
