//! Directory resolution abstraction for platform-specific paths.
//!
//! Production code resolves the per-user configuration directory through
//! `directories-next`; tests substitute their own [`BaseDirs`] implementation
//! pointing into a temporary directory.

use directories_next::ProjectDirs;
use std::path::PathBuf;

/// Application name used for the per-user directories.
pub const APP_NAME: &str = "navdrop";

/// Source of the directories the installer reads and writes.
pub trait BaseDirs {
    /// Directory holding the navdrop configuration file.
    fn config_dir(&self) -> Option<PathBuf>;
}

/// [`BaseDirs`] backed by the operating system's conventions.
///
/// Resolves to `~/.config/navdrop` on Linux, `~/Library/Application
/// Support/navdrop` on macOS and `%APPDATA%\navdrop\config` on Windows.
#[derive(Debug, Clone)]
pub struct SystemBaseDirs {
    project: ProjectDirs,
}

impl SystemBaseDirs {
    /// Resolve the system directories.
    ///
    /// Returns `None` when no home directory can be determined.
    #[must_use]
    pub fn new() -> Option<Self> {
        ProjectDirs::from("", "", APP_NAME).map(|project| Self { project })
    }
}

impl BaseDirs for SystemBaseDirs {
    fn config_dir(&self) -> Option<PathBuf> {
        Some(self.project.config_dir().to_path_buf())
    }
}

impl<T: BaseDirs> BaseDirs for Option<T> {
    fn config_dir(&self) -> Option<PathBuf> {
        self.as_ref().and_then(BaseDirs::config_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_dirs_have_no_config_dir() {
        let dirs: Option<SystemBaseDirs> = None;
        assert!(dirs.config_dir().is_none());
    }

    #[test]
    fn system_config_dir_names_the_application() {
        // Skip in environments without a home directory (e.g., CI containers).
        let Some(dirs) = SystemBaseDirs::new() else {
            return;
        };
        let dir = dirs.config_dir().expect("config dir");
        assert!(dir.to_string_lossy().contains(APP_NAME));
    }
}
