//! Filesystem layout of an OpenAPS autotune directory.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::constants;

/// Formats a day the way every date-keyed filename expects it (`YYYY-MM-DD`).
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format(constants::DATE_FORMAT).to_string()
}

/// Every path the run reads or writes, derived from the base directory.
///
/// Per-iteration names depend only on the run number and the calendar day,
/// so two iterations never share a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutotuneLayout {
    base: PathBuf,
}

impl AutotuneLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn settings_dir(&self) -> PathBuf {
        self.base.join(constants::SETTINGS_DIR_NAME)
    }

    pub fn autotune_dir(&self) -> PathBuf {
        self.base.join(constants::AUTOTUNE_DIR_NAME)
    }

    // settings/

    pub fn pump_profile_template(&self) -> PathBuf {
        self.settings_dir().join(constants::PUMP_PROFILE_TEMPLATE)
    }

    pub fn settings_profile(&self) -> PathBuf {
        self.settings_dir().join(constants::SETTINGS_PROFILE)
    }

    pub fn settings_autotune(&self) -> PathBuf {
        self.settings_dir().join(constants::SETTINGS_AUTOTUNE)
    }

    // autotune/

    pub fn current_profile(&self) -> PathBuf {
        self.autotune_dir().join(constants::CURRENT_PROFILE)
    }

    pub fn profile_pump(&self) -> PathBuf {
        self.autotune_dir().join(constants::PROFILE_PUMP)
    }

    pub fn prep_pump_profile(&self) -> PathBuf {
        self.autotune_dir().join(constants::PREP_PUMP_PROFILE)
    }

    pub fn ns_profile(&self) -> PathBuf {
        self.autotune_dir().join(constants::NS_PROFILE)
    }

    pub fn ns_treatments(&self) -> PathBuf {
        self.autotune_dir().join(constants::NS_TREATMENTS)
    }

    pub fn ns_entries(&self, date: NaiveDate) -> PathBuf {
        self.autotune_dir()
            .join(format!("ns-entries.{}.json", date_key(date)))
    }

    /// Copy of the current profile taken at the start of an iteration.
    pub fn profile_snapshot(&self, run: u32, date: NaiveDate) -> PathBuf {
        self.autotune_dir()
            .join(format!("profile.{run}.{}.json", date_key(date)))
    }

    /// Prep tool output for an iteration.
    pub fn prepped(&self, run: u32, date: NaiveDate) -> PathBuf {
        self.autotune_dir()
            .join(format!("autotune.{run}.{}.json", date_key(date)))
    }

    /// Core tool output for an iteration; becomes the next current profile.
    pub fn new_profile(&self, run: u32, date: NaiveDate) -> PathBuf {
        self.autotune_dir()
            .join(format!("newprofile.{run}.{}.json", date_key(date)))
    }

    pub fn recommendations_log(&self) -> PathBuf {
        self.autotune_dir().join(constants::RECOMMENDATIONS_LOG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_key_has_no_time_component() {
        assert_eq!(date_key(day(2024, 3, 7)), "2024-03-07");
    }

    #[test]
    fn test_settings_paths() {
        let layout = AutotuneLayout::new("/home/user/myopenaps");
        assert_eq!(
            layout.pump_profile_template(),
            PathBuf::from("/home/user/myopenaps/settings/pumpprofile.json")
        );
        assert_eq!(
            layout.settings_autotune(),
            PathBuf::from("/home/user/myopenaps/settings/autotune.json")
        );
    }

    #[test]
    fn test_iteration_paths_are_keyed_by_run_and_day() {
        let layout = AutotuneLayout::new("/oa");
        let d = day(2024, 1, 2);
        assert_eq!(
            layout.profile_snapshot(3, d),
            PathBuf::from("/oa/autotune/profile.3.2024-01-02.json")
        );
        assert_eq!(
            layout.prepped(3, d),
            PathBuf::from("/oa/autotune/autotune.3.2024-01-02.json")
        );
        assert_eq!(
            layout.new_profile(3, d),
            PathBuf::from("/oa/autotune/newprofile.3.2024-01-02.json")
        );
        assert_ne!(layout.new_profile(1, d), layout.new_profile(2, d));
    }

    #[test]
    fn test_entries_path() {
        let layout = AutotuneLayout::new("/oa");
        assert_eq!(
            layout.ns_entries(day(2023, 12, 31)),
            PathBuf::from("/oa/autotune/ns-entries.2023-12-31.json")
        );
    }
}
