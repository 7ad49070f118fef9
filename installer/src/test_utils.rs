//! Shared test utilities for the installer crate.

use crate::archiver::{ArchiveExtractor, ExtractionError};
use crate::executor::CommandExecutor;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The program to execute.
    pub program: PathBuf,
    /// The arguments to pass to the program.
    pub args: Vec<OsString>,
    /// The result to return when this command is invoked.
    pub result: io::Result<Output>,
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<Output> {
        let mut expected = self.expected.borrow_mut();
        let call = expected.pop_front().expect("unexpected command invocation");

        assert_eq!(call.program, program);
        assert_eq!(call.args.as_slice(), args);

        call.result
    }
}

/// Contents an archive fixture expands to.
#[derive(Debug, Clone, Default)]
pub struct ArchiveFixture {
    files: Vec<(PathBuf, Vec<u8>)>,
    dirs: Vec<PathBuf>,
    fails: bool,
}

impl ArchiveFixture {
    /// An archive that expands to nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An archive whose extraction fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fails: true,
            ..Self::default()
        }
    }

    /// Add a file at `path` (relative, `/`-separated) with `contents`.
    #[must_use]
    pub fn file(mut self, path: &str, contents: &[u8]) -> Self {
        self.files.push((PathBuf::from(path), contents.to_vec()));
        self
    }

    /// Add an empty directory at `path`.
    #[must_use]
    pub fn dir(mut self, path: &str) -> Self {
        self.dirs.push(PathBuf::from(path));
        self
    }

    fn materialise(&self, output_dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(output_dir)?;
        for dir in &self.dirs {
            std::fs::create_dir_all(output_dir.join(dir))?;
        }
        for (path, contents) in &self.files {
            let target = output_dir.join(path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(target, contents)?;
        }
        Ok(())
    }
}

/// One recorded extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionCall {
    /// Archive passed to the extractor.
    pub archive: PathBuf,
    /// Output directory passed to the extractor.
    pub output_dir: PathBuf,
}

/// [`ArchiveExtractor`] that materialises registered fixture trees.
///
/// Fixtures are keyed by a relative path that must match the tail of the
/// archive path, e.g. `NavDataXP12.zip` or `xp11/NavDataXP12.zip`. The
/// longest matching key wins. Archives without a fixture fail to extract.
#[derive(Debug, Default)]
pub struct FixtureExtractor {
    fixtures: Vec<(PathBuf, ArchiveFixture)>,
    calls: RefCell<Vec<ExtractionCall>>,
}

impl FixtureExtractor {
    /// Create an extractor with no fixtures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the contents of archives whose path ends with `key`.
    #[must_use]
    pub fn with_archive(mut self, key: &str, fixture: ArchiveFixture) -> Self {
        self.fixtures.push((PathBuf::from(key), fixture));
        self
    }

    /// Every extraction performed so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ExtractionCall> {
        self.calls.borrow().clone()
    }

    fn lookup(&self, archive_path: &Path) -> Option<&ArchiveFixture> {
        self.fixtures
            .iter()
            .filter(|(key, _)| archive_path.ends_with(key))
            .max_by_key(|(key, _)| key.components().count())
            .map(|(_, fixture)| fixture)
    }
}

impl ArchiveExtractor for FixtureExtractor {
    fn extract(&self, archive_path: &Path, output_dir: &Path) -> Result<(), ExtractionError> {
        self.calls.borrow_mut().push(ExtractionCall {
            archive: archive_path.to_owned(),
            output_dir: output_dir.to_owned(),
        });

        let failed = |reason: &str| ExtractionError::Failed {
            archive: archive_path.to_owned(),
            status: "exited with code 2".to_owned(),
            diagnostics: reason.to_owned(),
        };

        match self.lookup(archive_path) {
            None => Err(failed("no fixture registered")),
            Some(fixture) if fixture.fails => Err(failed("fixture marked as failing")),
            Some(fixture) => {
                fixture
                    .materialise(output_dir)
                    .map_err(|source| ExtractionError::OutputDir {
                        path: output_dir.to_owned(),
                        source,
                    })
            }
        }
    }
}
