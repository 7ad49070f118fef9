//! The install command: run the distribution pipeline over dropped archives.
//!
//! Archives are processed one after another. Each gets its own status block
//! on stderr, and a failure in one never stops the rest.

use crate::archiver::ArchiveExtractor;
use crate::config::Settings;
use crate::output::{format_outcome, summary_message, write_stderr_line};
use crate::pipeline::{DistributionConfig, DistributionOutcome, process_archive};
use crate::rules::RuleTable;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::io::Write;

/// Outer archive extensions accepted for installation (lowercase, no dot).
pub const ACCEPTED_EXTENSIONS: &[&str] = &["zip", "rar", "7z"];

/// Returns true if `path` has an accepted outer archive extension.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use navdrop_installer::install::is_accepted_archive;
///
/// assert!(is_accepted_archive(Utf8Path::new("NavData.7Z")));
/// assert!(!is_accepted_archive(Utf8Path::new("NavData.tar.gz")));
/// ```
#[must_use]
pub fn is_accepted_archive(path: &Utf8Path) -> bool {
    path.extension().is_some_and(|ext| {
        ACCEPTED_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// Tally of an install run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallSummary {
    /// Archives handed to the pipeline.
    pub attempted: usize,
    /// Archives whose matched sub-packages all installed.
    pub succeeded: usize,
    /// Paths rejected because of their extension.
    pub skipped: Vec<Utf8PathBuf>,
}

impl InstallSummary {
    /// Returns true if nothing was skipped and every attempted archive
    /// installed cleanly.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.skipped.is_empty() && self.succeeded == self.attempted
    }
}

/// Context shared by every archive of one install run.
pub struct InstallContext<'a> {
    /// Archiver and clean-up settings.
    pub settings: &'a Settings,
    /// Sub-package routing rules.
    pub rules: &'a RuleTable,
    /// Suppress progress output (failures are still reported).
    pub quiet: bool,
}

/// Run the pipeline for each of `archives` and report on `stderr`.
///
/// Paths without an accepted extension are skipped with a message. Failed
/// outcomes are written even in quiet mode.
pub fn run_install(
    context: &InstallContext<'_>,
    archives: &[Utf8PathBuf],
    extractor: &dyn ArchiveExtractor,
    stderr: &mut dyn Write,
) -> InstallSummary {
    let mut summary = InstallSummary::default();
    let config = DistributionConfig {
        archiver_available: context.settings.archiver_available(),
        auto_delete: context.settings.auto_delete_archive,
        rules: context.rules,
    };
    debug!(
        "archiver {} available: {}",
        context.settings.archiver_path, config.archiver_available
    );

    for archive in archives {
        if !is_accepted_archive(archive) {
            write_stderr_line(
                stderr,
                format!(
                    "Skipping {archive}: not a {} archive",
                    ACCEPTED_EXTENSIONS.join("/")
                ),
            );
            summary.skipped.push(archive.clone());
            continue;
        }

        let name = archive.file_name().unwrap_or(archive.as_str());
        if !context.quiet {
            write_stderr_line(stderr, format!("Installing {name}..."));
        }

        summary.attempted += 1;
        let outcome = process_archive(archive.as_std_path(), &config, extractor);
        let succeeded = outcome.is_success();
        if succeeded {
            summary.succeeded += 1;
        }
        if !succeeded || !context.quiet {
            write_stderr_line(stderr, format_outcome(name, &outcome));
        }

        // Later archives would report the same missing archiver.
        if matches!(outcome, DistributionOutcome::NoArchiverConfigured) {
            break;
        }
    }

    if !context.quiet && archives.len() > 1 {
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, summary_message(summary.succeeded, archives.len()));
    }

    summary
}
