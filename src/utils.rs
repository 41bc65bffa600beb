//! Small filesystem helpers.

use std::path::PathBuf;

/// The current user's home directory.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Expands a leading `~` or `~/` to the home directory.
///
/// Anything else, including `~otheruser/...`, is returned unchanged.
pub fn expand_home(path_str: &str) -> PathBuf {
    if path_str == "~" {
        if let Some(home) = home_dir() {
            return home;
        }
    }
    if let Some(stripped) = path_str.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path_str)
}
