//! Nested archive discovery and wrapper-folder normalisation.
//!
//! After the dropped archive is extracted, its staging tree is scanned for
//! nested `.zip` files. Each one is a candidate sub-package whose base name is
//! matched against the rule table. Once a sub-package is extracted,
//! [`resolve_effective_root`] strips a single top-level wrapping folder, the
//! layout most download sites produce.

use log::{trace, warn};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions (lowercase, without dot) recognised as nested sub-packages.
pub const NESTED_ARCHIVE_EXTENSIONS: &[&str] = &["zip"];

/// A nested archive found inside an extracted staging tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedArchive {
    /// Full path to the archive file.
    pub path: PathBuf,
    /// File name including the extension, e.g. `NavDataXP12.zip`.
    pub file_name: String,
    /// File name without the extension, matched against rule names.
    pub base_name: String,
    /// Directory containing the archive.
    pub containing_dir: PathBuf,
}

impl NestedArchive {
    fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        let base_name = path.file_stem()?.to_string_lossy().into_owned();
        let containing_dir = path.parent()?.to_owned();
        Some(Self {
            path: path.to_owned(),
            file_name,
            base_name,
            containing_dir,
        })
    }
}

/// Returns true if `path` has a recognised nested-archive extension.
///
/// The comparison ignores ASCII case.
///
/// # Examples
///
/// ```
/// use navdrop_installer::resolver::is_nested_archive;
/// use std::path::Path;
///
/// assert!(is_nested_archive(Path::new("NavDataXP12.ZIP")));
/// assert!(!is_nested_archive(Path::new("readme.txt")));
/// ```
#[must_use]
pub fn is_nested_archive(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| {
            NESTED_ARCHIVE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Lazily walk `root` and yield every nested archive beneath it.
///
/// Entries are visited depth-first in file-name order within each directory,
/// so repeated scans of the same tree yield the same sequence. Symbolic links
/// are followed, but a directory whose canonical path was already visited is
/// skipped, which also breaks link cycles. Unreadable entries are logged and
/// skipped.
#[must_use]
pub fn find_nested_archives(root: &Path) -> NestedArchives {
    NestedArchives {
        walker: WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter(),
        visited: HashSet::new(),
    }
}

/// Iterator returned by [`find_nested_archives`].
pub struct NestedArchives {
    walker: walkdir::IntoIter,
    visited: HashSet<PathBuf>,
}

impl Iterator for NestedArchives {
    type Item = NestedArchive;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    if err.loop_ancestor().is_some() {
                        trace!("skipping symlink cycle: {err}");
                    } else {
                        warn!("skipping unreadable entry while scanning: {err}");
                    }
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                let real = std::fs::canonicalize(entry.path())
                    .unwrap_or_else(|_| entry.path().to_owned());
                if !self.visited.insert(real) {
                    trace!("already visited {}", entry.path().display());
                    self.walker.skip_current_dir();
                }
                continue;
            }

            if entry.file_type().is_file() && is_nested_archive(entry.path()) {
                if let Some(archive) = NestedArchive::from_path(entry.path()) {
                    return Some(archive);
                }
            }
        }
    }
}

/// Return the directory holding an extracted sub-package's real content.
///
/// If `extracted_dir` contains exactly one entry and that entry is a
/// directory, its path is returned; otherwise `extracted_dir` itself is. Only
/// one level is ever unwrapped.
///
/// # Errors
///
/// Returns an error if `extracted_dir` cannot be listed.
pub fn resolve_effective_root(extracted_dir: &Path) -> io::Result<PathBuf> {
    let mut entries = std::fs::read_dir(extracted_dir)?;
    let Some(first) = entries.next().transpose()? else {
        return Ok(extracted_dir.to_owned());
    };
    if entries.next().is_some() {
        return Ok(extracted_dir.to_owned());
    }

    let candidate = first.path();
    if candidate.is_dir() {
        trace!("unwrapping single folder {}", candidate.display());
        Ok(candidate)
    } else {
        Ok(extracted_dir.to_owned())
    }
}
