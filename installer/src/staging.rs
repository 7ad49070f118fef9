//! Scoped scratch directories for extraction.

use log::{trace, warn};
use std::io;
use std::path::Path;
use tempfile::TempDir;

/// Prefix given to every staging directory.
pub const STAGING_PREFIX: &str = "navdrop-";

/// Exclusively owned scratch directory, removed when dropped.
///
/// Removal happens on every exit path, including early returns and unwinding.
/// A failed removal is logged and otherwise ignored.
#[derive(Debug)]
pub struct StagingArea {
    dir: Option<TempDir>,
}

impl StagingArea {
    /// Create a uniquely named staging directory under the system temp area.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(STAGING_PREFIX).tempdir()?;
        trace!("created staging area {}", dir.path().display());
        Ok(Self { dir: Some(dir) })
    }

    /// Create a staging directory inside `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new_in(parent: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)?;
        trace!("created staging area {}", dir.path().display());
        Ok(Self { dir: Some(dir) })
    }

    /// Path of the staging directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.as_ref().map_or_else(|| Path::new(""), TempDir::path)
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = dir.path().to_owned();
        match dir.close() {
            Ok(()) => trace!("removed staging area {}", path.display()),
            Err(err) => warn!("failed to remove staging area {}: {err}", path.display()),
        }
    }
}
