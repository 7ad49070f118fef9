//! Overwriting merge of one directory tree into another.
//!
//! Sub-package contents are unioned into their destination: directories are
//! created as needed, files replace same-named files, and anything already in
//! the destination that the sub-package does not carry is left untouched.
//! There is no rollback; a failure part-way leaves the files copied so far in
//! place.

use filetime::FileTime;
use log::trace;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Errors raised while merging a tree.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The source tree could not be traversed.
    #[error("failed to read {}", .path.display())]
    Walk {
        /// Path that could not be read.
        path: PathBuf,
        /// The underlying traversal error.
        #[source]
        source: walkdir::Error,
    },

    /// A destination directory could not be created.
    #[error("failed to create directory {}", .path.display())]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A file could not be copied.
    #[error("failed to copy {} to {}", .from.display(), .to.display())]
    Copy {
        /// Source file.
        from: PathBuf,
        /// Destination file.
        to: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Counts of what a merge wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Files copied (including overwrites).
    pub files: usize,
    /// Directories visited under the destination.
    pub directories: usize,
}

/// Merge the contents of `source` into `destination`.
///
/// `destination` and any missing ancestors are created. Files overwrite
/// existing files of the same name; modification times are carried over when
/// the platform allows. The walk is iterative, so deeply nested trees do not
/// grow the call stack.
///
/// # Errors
///
/// Stops at the first directory that cannot be created or file that cannot
/// be copied and returns a [`MergeError`] naming it. Files already copied are
/// not rolled back.
pub fn merge_copy(source: &Path, destination: &Path) -> Result<MergeStats, MergeError> {
    std::fs::create_dir_all(destination).map_err(|err| MergeError::CreateDir {
        path: destination.to_owned(),
        source: err,
    })?;

    let mut stats = MergeStats::default();
    let walker = WalkDir::new(source)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|err| MergeError::Walk {
            path: err
                .path()
                .map_or_else(|| source.to_owned(), Path::to_owned),
            source: err,
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|err| MergeError::CreateDir {
                path: target.clone(),
                source: err,
            })?;
            stats.directories += 1;
            continue;
        }

        std::fs::copy(entry.path(), &target).map_err(|err| MergeError::Copy {
            from: entry.path().to_owned(),
            to: target.clone(),
            source: err,
        })?;
        preserve_mtime(entry.path(), &target);
        stats.files += 1;
    }

    Ok(stats)
}

fn preserve_mtime(from: &Path, to: &Path) {
    let result = std::fs::metadata(from).and_then(|metadata| {
        filetime::set_file_mtime(to, FileTime::from_last_modification_time(&metadata))
    });
    if let Err(err) = result {
        trace!("could not preserve mtime on {}: {err}", to.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
        fs::write(path, contents).expect("write file");
    }

    fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        WalkDir::new(root)
            .into_iter()
            .map(|entry| entry.expect("walk"))
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let relative = entry
                    .path()
                    .strip_prefix(root)
                    .expect("relative")
                    .to_owned();
                (relative, fs::read(entry.path()).expect("read"))
            })
            .collect()
    }

    #[test]
    fn creates_missing_destination_and_ancestors() {
        let temp = TempDir::new().expect("temp dir");
        let src = temp.path().join("src");
        write(&src, "cycle.dat", "2405");
        write(&src, "navdata/airports.txt", "EGLL");
        let dst = temp.path().join("x").join("y").join("Custom Data");

        let stats = merge_copy(&src, &dst).expect("merge");

        assert_eq!(fs::read_to_string(dst.join("cycle.dat")).expect("read"), "2405");
        assert_eq!(
            fs::read_to_string(dst.join("navdata").join("airports.txt")).expect("read"),
            "EGLL"
        );
        assert_eq!(stats, MergeStats { files: 2, directories: 1 });
    }

    #[test]
    fn overwrites_files_and_keeps_unrelated_siblings() {
        let temp = TempDir::new().expect("temp dir");
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        write(&src, "navdata/airports.txt", "new");
        write(&dst, "navdata/airports.txt", "old");
        write(&dst, "navdata/waypoints.txt", "keep");
        write(&dst, "settings.ini", "keep");

        merge_copy(&src, &dst).expect("merge");

        let navdata = dst.join("navdata");
        assert_eq!(fs::read_to_string(navdata.join("airports.txt")).expect("read"), "new");
        assert_eq!(fs::read_to_string(navdata.join("waypoints.txt")).expect("read"), "keep");
        assert_eq!(fs::read_to_string(dst.join("settings.ini")).expect("read"), "keep");
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let temp = TempDir::new().expect("temp dir");
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        write(&src, "a/b/c/deep.dat", "deep");
        write(&src, "top.dat", "top");
        write(&dst, "existing.dat", "existing");

        merge_copy(&src, &dst).expect("first merge");
        let first = snapshot(&dst);
        merge_copy(&src, &dst).expect("second merge");

        assert_eq!(snapshot(&dst), first);
    }

    #[test]
    fn empty_directories_are_recreated() {
        let temp = TempDir::new().expect("temp dir");
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("empty")).expect("create empty");
        let dst = temp.path().join("dst");

        merge_copy(&src, &dst).expect("merge");

        assert!(dst.join("empty").is_dir());
    }

    #[test]
    fn modification_time_is_preserved() {
        let temp = TempDir::new().expect("temp dir");
        let src = temp.path().join("src");
        write(&src, "cycle.dat", "2405");
        let stamp = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(src.join("cycle.dat"), stamp).expect("set mtime");
        let dst = temp.path().join("dst");

        merge_copy(&src, &dst).expect("merge");

        let metadata = fs::metadata(dst.join("cycle.dat")).expect("metadata");
        assert_eq!(FileTime::from_last_modification_time(&metadata), stamp);
    }

    #[test]
    fn destination_blocked_by_a_file_is_reported() {
        let temp = TempDir::new().expect("temp dir");
        let src = temp.path().join("src");
        write(&src, "navdata/airports.txt", "EGLL");
        let dst = temp.path().join("dst");
        write(&dst, "navdata", "I am a file");

        let err = merge_copy(&src, &dst).expect_err("merge should fail");

        assert!(
            matches!(err, MergeError::CreateDir { ref path, .. } if *path == dst.join("navdata")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn missing_source_is_reported() {
        let temp = TempDir::new().expect("temp dir");
        let err = merge_copy(&temp.path().join("absent"), &temp.path().join("dst"))
            .expect_err("merge should fail");
        assert!(matches!(err, MergeError::Walk { .. }));
    }
}
