//! Extraction adapter backed by an external archiver.
//!
//! navdrop never decodes archive formats itself. The pipeline depends only on
//! [`ArchiveExtractor`]; production code plugs in [`CommandExtractor`], which
//! shells out to Bandizip or 7-Zip and maps any failure to
//! [`ExtractionError`]. Output left behind by a failed extraction is never
//! treated as usable.

use crate::executor::{CommandExecutor, SystemCommandExecutor};
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Trait for extracting archives, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Extract the archive at `archive_path` into `output_dir`.
    ///
    /// `output_dir` is created when missing. On success it holds the
    /// archive's contents with their directory structure preserved.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] when the archiver cannot be run or
    /// reports failure.
    fn extract(&self, archive_path: &Path, output_dir: &Path) -> Result<(), ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The output directory could not be created.
    #[error("failed to create extraction directory {}", .path.display())]
    OutputDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The archiver executable could not be started.
    #[error("failed to run archiver {}", .program.display())]
    Spawn {
        /// The archiver executable.
        program: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The archiver ran but reported failure.
    #[error(
        "archiver {status} while extracting {}{}",
        .archive.display(),
        diagnostics_suffix(.diagnostics)
    )]
    Failed {
        /// The archive being extracted.
        archive: PathBuf,
        /// Human-readable exit status.
        status: String,
        /// Diagnostic output captured from the archiver.
        diagnostics: String,
    },
}

fn diagnostics_suffix(diagnostics: &str) -> String {
    if diagnostics.is_empty() {
        String::new()
    } else {
        format!(": {diagnostics}")
    }
}

/// Command-line dialect of a supported archiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiverDialect {
    /// Bandizip console syntax: `x -o:<dir> -y <archive>`.
    Bandizip,
    /// 7-Zip syntax: `x -o<dir> -y <archive>`.
    SevenZip,
}

impl ArchiverDialect {
    /// Infer the dialect from the executable's file name.
    ///
    /// Unknown executables are assumed to speak the 7-Zip dialect.
    ///
    /// # Examples
    ///
    /// ```
    /// use navdrop_installer::archiver::ArchiverDialect;
    /// use std::path::Path;
    ///
    /// let dialect = ArchiverDialect::from_executable(Path::new("Bandizip.exe"));
    /// assert_eq!(dialect, ArchiverDialect::Bandizip);
    /// ```
    #[must_use]
    pub fn from_executable(program: &Path) -> Self {
        let stem = program
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match stem.as_str() {
            "bandizip" | "bz" | "bc" => Self::Bandizip,
            _ => Self::SevenZip,
        }
    }

    /// Build the extract-with-overwrite argument list.
    #[must_use]
    pub fn extract_args(self, archive_path: &Path, output_dir: &Path) -> Vec<OsString> {
        let mut output_flag = OsString::from(match self {
            Self::Bandizip => "-o:",
            Self::SevenZip => "-o",
        });
        output_flag.push(output_dir.as_os_str());
        vec![
            OsString::from("x"),
            output_flag,
            OsString::from("-y"),
            archive_path.as_os_str().to_owned(),
        ]
    }
}

/// [`ArchiveExtractor`] that runs an external archiver executable.
#[derive(Debug, Clone)]
pub struct CommandExtractor<E = SystemCommandExecutor> {
    program: PathBuf,
    dialect: ArchiverDialect,
    executor: E,
}

impl CommandExtractor {
    /// Create an extractor that runs `program` on the host system.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_executor(program, SystemCommandExecutor)
    }
}

impl<E: CommandExecutor> CommandExtractor<E> {
    /// Create an extractor that runs `program` through `executor`.
    #[must_use]
    pub fn with_executor(program: impl Into<PathBuf>, executor: E) -> Self {
        let program = program.into();
        let dialect = ArchiverDialect::from_executable(&program);
        Self {
            program,
            dialect,
            executor,
        }
    }

    /// The dialect used for this archiver.
    #[must_use]
    pub fn dialect(&self) -> ArchiverDialect {
        self.dialect
    }
}

impl<E: CommandExecutor> ArchiveExtractor for CommandExtractor<E> {
    fn extract(&self, archive_path: &Path, output_dir: &Path) -> Result<(), ExtractionError> {
        std::fs::create_dir_all(output_dir).map_err(|source| ExtractionError::OutputDir {
            path: output_dir.to_owned(),
            source,
        })?;

        let args = self.dialect.extract_args(archive_path, output_dir);
        debug!(
            "running {} {:?}",
            self.program.display(),
            args.iter().map(|a| a.to_string_lossy()).collect::<Vec<_>>()
        );
        let output =
            self.executor
                .run(&self.program, &args)
                .map_err(|source| ExtractionError::Spawn {
                    program: self.program.clone(),
                    source,
                })?;

        if output.status.success() {
            return Ok(());
        }

        let status = output.status.code().map_or_else(
            || "was terminated by a signal".to_owned(),
            |code| format!("exited with code {code}"),
        );
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        let diagnostics = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_owned()
        } else {
            stderr
        };
        Err(ExtractionError::Failed {
            archive: archive_path.to_owned(),
            status,
            diagnostics,
        })
    }
}
