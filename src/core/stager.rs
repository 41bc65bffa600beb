//! Seeds the profile chain from the pump profile template.

use std::fs;
use std::path::Path;

use crate::error::{AutotuneError, Result};
use crate::state::AutotuneLayout;

/// Copies `settings/pumpprofile.json` into every file the tuning loop starts
/// from, overwriting whatever a previous run left behind.
///
/// Copy order follows the chain pumpprofile → settings/profile →
/// settings/autotune → autotune/profile and autotune/pumpprofile, so every
/// staged file ends up byte-identical to the template.
///
/// # Errors
///
/// Returns [`AutotuneError::FileNotFound`] if the template is missing, or an
/// I/O error if any copy fails.
pub fn stage_profiles(layout: &AutotuneLayout) -> Result<()> {
    let template = layout.pump_profile_template();
    if !template.is_file() {
        return Err(AutotuneError::FileNotFound { path: template });
    }

    copy(&template, &layout.profile_pump())?;
    copy(&template, &layout.settings_profile())?;
    copy(&layout.settings_profile(), &layout.settings_autotune())?;
    copy(&layout.settings_autotune(), &layout.current_profile())?;
    copy(&layout.settings_autotune(), &layout.prep_pump_profile())?;

    tracing::info!(template = %template.display(), "staged profiles");
    Ok(())
}

fn copy(from: &Path, to: &Path) -> Result<()> {
    tracing::debug!(from = %from.display(), to = %to.display(), "copy");
    fs::copy(from, to).map_err(|e| AutotuneError::io(to, e))?;
    Ok(())
}
