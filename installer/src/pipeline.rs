//! Archive distribution pipeline orchestration.
//!
//! [`process_archive`] takes one dropped archive through the whole flow:
//! outer extraction into a staging area, nested-archive discovery, rule
//! matching, and per-match extraction, unwrapping and merge into the rule's
//! destination. It coordinates the archiver, resolver, merge and staging
//! modules and reports what happened as a [`DistributionOutcome`]; rendering
//! that outcome for the user is left to [`crate::output`].

use crate::archiver::{ArchiveExtractor, ExtractionError};
use crate::merge::{MergeError, MergeStats, merge_copy};
use crate::resolver::{NestedArchive, find_nested_archives, resolve_effective_root};
use crate::rules::RuleTable;
use crate::staging::StagingArea;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::path::Path;

/// Inputs the pipeline needs from configuration.
#[derive(Debug, Clone, Copy)]
pub struct DistributionConfig<'a> {
    /// Whether the configured archiver executable exists.
    pub archiver_available: bool,
    /// Delete the input archive once at least one rule matched.
    pub auto_delete: bool,
    /// Sub-package name to destination mapping.
    pub rules: &'a RuleTable,
}

/// Why a single matched sub-package was not installed.
#[derive(Debug, thiserror::Error)]
pub enum SubPackageError {
    /// No staging area could be created for it.
    #[error("failed to create staging area")]
    Staging(#[source] std::io::Error),

    /// The nested archive could not be extracted.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The extracted contents could not be listed.
    #[error("failed to inspect extracted contents")]
    Resolve(#[source] std::io::Error),

    /// Copying into the destination failed part-way.
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Result of installing one matched sub-package.
#[derive(Debug)]
pub struct SubPackageReport {
    /// Base name of the nested archive.
    pub name: String,
    /// Destination the rule maps it to.
    pub destination: Utf8PathBuf,
    /// What the merge wrote, or why the sub-package was skipped.
    pub result: Result<MergeStats, SubPackageError>,
}

impl SubPackageReport {
    /// Returns true if the sub-package was merged without error.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Details of a run that matched at least one sub-package.
#[derive(Debug)]
pub struct DistributionReport {
    /// Number of distinct matched sub-package names.
    pub matched_count: usize,
    /// Discovered names with no rule.
    pub unmatched: BTreeSet<String>,
    /// One report per processed nested archive, in discovery order.
    pub sub_packages: Vec<SubPackageReport>,
    /// Whether the input archive was deleted afterwards.
    pub archive_deleted: bool,
}

impl DistributionReport {
    /// Returns true if every processed sub-package succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.sub_packages.iter().all(SubPackageReport::succeeded)
    }
}

/// What [`process_archive`] did with one input archive.
#[derive(Debug)]
pub enum DistributionOutcome {
    /// The archiver is not available; nothing was touched.
    NoArchiverConfigured,
    /// No nested archive matched a rule.
    NoMatches {
        /// Discovered names with no rule. Empty when extraction failed.
        unmatched: BTreeSet<String>,
        /// Whether the input archive itself failed to extract.
        extraction_failed: bool,
    },
    /// At least one nested archive matched a rule.
    Distributed(DistributionReport),
}

impl DistributionOutcome {
    /// Returns true if at least one sub-package matched and all of them
    /// installed cleanly.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Distributed(report) if report.all_succeeded())
    }
}

/// Distribute the nested sub-packages of `archive_path` according to
/// `config.rules`.
///
/// Every failure is captured in the returned outcome rather than raised:
/// an outer extraction failure becomes [`DistributionOutcome::NoMatches`],
/// and a failing sub-package is recorded in its [`SubPackageReport`] while
/// its siblings carry on. All staging areas are removed before this returns.
///
/// Nested archives sharing a base name are all installed in discovery order,
/// so the last one wins on conflicting files. When `auto_delete` is set the
/// input archive is deleted after any distribution that matched a rule, even
/// if some sub-packages failed; a failed deletion is logged and otherwise
/// ignored.
#[must_use]
pub fn process_archive(
    archive_path: &Path,
    config: &DistributionConfig<'_>,
    extractor: &dyn ArchiveExtractor,
) -> DistributionOutcome {
    if !config.archiver_available {
        return DistributionOutcome::NoArchiverConfigured;
    }

    let staging = match StagingArea::new() {
        Ok(staging) => staging,
        Err(err) => {
            warn!("failed to create staging area: {err}");
            return extraction_failed();
        }
    };

    debug!(
        "extracting {} into {}",
        archive_path.display(),
        staging.path().display()
    );
    if let Err(err) = extractor.extract(archive_path, staging.path()) {
        warn!("failed to extract {}: {err}", archive_path.display());
        return extraction_failed();
    }

    let nested: Vec<NestedArchive> = find_nested_archives(staging.path()).collect();
    debug!("found {} nested archive(s)", nested.len());

    let (matched, unmatched) = partition_names(&nested, config.rules);
    if matched.is_empty() {
        return DistributionOutcome::NoMatches {
            unmatched,
            extraction_failed: false,
        };
    }

    let sub_packages: Vec<SubPackageReport> = nested
        .iter()
        .filter_map(|archive| {
            let destination = config.rules.destination(&archive.base_name)?;
            Some(SubPackageReport {
                name: archive.base_name.clone(),
                destination: destination.to_owned(),
                result: install_sub_package(archive, destination, extractor),
            })
        })
        .collect();

    let mut report = DistributionReport {
        matched_count: matched.len(),
        unmatched,
        sub_packages,
        archive_deleted: false,
    };

    // The outer staging tree must not outlive the run, even if deleting the
    // input archive below fails.
    drop(staging);

    if config.auto_delete {
        report.archive_deleted = delete_archive(archive_path);
    }

    DistributionOutcome::Distributed(report)
}

fn extraction_failed() -> DistributionOutcome {
    DistributionOutcome::NoMatches {
        unmatched: BTreeSet::new(),
        extraction_failed: true,
    }
}

/// Split the discovered base names into those with a rule and those without.
fn partition_names(
    nested: &[NestedArchive],
    rules: &RuleTable,
) -> (BTreeSet<String>, BTreeSet<String>) {
    nested
        .iter()
        .map(|archive| archive.base_name.clone())
        .partition(|name| rules.contains(name))
}

fn install_sub_package(
    archive: &NestedArchive,
    destination: &Utf8Path,
    extractor: &dyn ArchiveExtractor,
) -> Result<MergeStats, SubPackageError> {
    let staging = StagingArea::new().map_err(SubPackageError::Staging)?;
    debug!(
        "extracting {} into {}",
        archive.file_name,
        staging.path().display()
    );
    extractor.extract(&archive.path, staging.path())?;

    let root = resolve_effective_root(staging.path()).map_err(SubPackageError::Resolve)?;
    let stats = merge_copy(&root, destination.as_std_path())?;
    info!(
        "merged {} file(s) from {} into {destination}",
        stats.files, archive.file_name
    );
    Ok(stats)
}

fn delete_archive(archive_path: &Path) -> bool {
    match std::fs::remove_file(archive_path) {
        Ok(()) => {
            debug!("deleted {}", archive_path.display());
            true
        }
        Err(err) => {
            warn!("failed to delete {}: {err}", archive_path.display());
            false
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
