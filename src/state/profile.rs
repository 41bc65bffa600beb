//! The current profile handle.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AutotuneError, Result};

/// The one "current" profile file the tuning loop advances.
///
/// Each iteration reads it, and the end of each iteration overwrites it with
/// the freshly tuned profile. The handle is not `Clone` and the driver holds
/// it by `&mut` for the whole loop: one writer.
#[derive(Debug)]
pub struct CurrentProfile {
    path: PathBuf,
    promotions: usize,
}

impl CurrentProfile {
    /// Takes ownership of the current profile at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            promotions: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of tuned profiles promoted through this handle.
    #[must_use]
    pub const fn promotions(&self) -> usize {
        self.promotions
    }

    /// Copies the current profile to `dest` as an audit snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the current profile cannot be copied.
    pub fn snapshot_to(&self, dest: &Path) -> Result<()> {
        fs::copy(&self.path, dest).map_err(|e| AutotuneError::io(&self.path, e))?;
        Ok(())
    }

    /// Replaces the current profile with the tuned profile at `tuned`.
    ///
    /// # Errors
    ///
    /// Returns [`AutotuneError::FileNotFound`] if the tuned profile was never
    /// written, or an I/O error if the copy fails.
    pub fn promote(&mut self, tuned: &Path) -> Result<()> {
        fs::copy(tuned, &self.path).map_err(|e| AutotuneError::io(tuned, e))?;
        self.promotions += 1;
        Ok(())
    }
}
