//! Output formatting for the installer CLI.
//!
//! Every [`DistributionOutcome`] maps to its own human-readable status text.
//! Rule and settings listings are formatted here too, as plain text or JSON.

use crate::config::Settings;
use crate::pipeline::{DistributionOutcome, DistributionReport, SubPackageReport};
use crate::rules::{Rule, RuleTable};
use camino::Utf8Path;
use serde::Serialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::Write as _;
use std::io::Write;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Render an error followed by each of its sources, separated by `": "`.
#[must_use]
pub fn error_chain(error: &dyn Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(text, ": {cause}");
        source = cause.source();
    }
    text
}

/// Format the status of one processed archive.
///
/// # Examples
///
/// ```
/// use navdrop_installer::output::format_outcome;
/// use navdrop_installer::pipeline::DistributionOutcome;
///
/// let text = format_outcome("Pack.zip", &DistributionOutcome::NoArchiverConfigured);
/// assert!(text.contains("archiver"));
/// ```
#[must_use]
pub fn format_outcome(archive_name: &str, outcome: &DistributionOutcome) -> String {
    match outcome {
        DistributionOutcome::NoArchiverConfigured => format!(
            concat!(
                "{}: archiver not found; nothing was installed.\n",
                "  Set it with `navdrop-installer settings set --archiver <PATH>`."
            ),
            archive_name
        ),
        DistributionOutcome::NoMatches {
            extraction_failed: true,
            ..
        } => format!("{archive_name}: could not be extracted; nothing was installed."),
        DistributionOutcome::NoMatches { unmatched, .. } if unmatched.is_empty() => {
            format!("{archive_name}: no nested archives found; nothing was installed.")
        }
        DistributionOutcome::NoMatches { unmatched, .. } => format!(
            "{archive_name}: no sub-package matched a rule.\n  Unmatched: {}",
            join_names(unmatched)
        ),
        DistributionOutcome::Distributed(report) => format_report(archive_name, report),
    }
}

fn format_report(archive_name: &str, report: &DistributionReport) -> String {
    let installed = report
        .sub_packages
        .iter()
        .filter(|sub| sub.succeeded())
        .count();
    let mut output = format!(
        "{archive_name}: installed {installed} of {} sub-package(s) ({} rule(s) matched)",
        report.sub_packages.len(),
        report.matched_count
    );
    for sub in &report.sub_packages {
        output.push('\n');
        output.push_str(&format_sub_package(sub));
    }
    if !report.unmatched.is_empty() {
        let _ = write!(output, "\n  Unmatched: {}", join_names(&report.unmatched));
    }
    if report.archive_deleted {
        let _ = write!(output, "\n  Deleted {archive_name}");
    }
    output
}

fn format_sub_package(sub: &SubPackageReport) -> String {
    match &sub.result {
        Ok(stats) => {
            let plural = if stats.files == 1 { "file" } else { "files" };
            format!(
                "  [ok] {} -> {} ({} {plural})",
                sub.name, sub.destination, stats.files
            )
        }
        Err(err) => format!(
            "  [failed] {} -> {}: {}",
            sub.name,
            sub.destination,
            error_chain(err)
        ),
    }
}

fn join_names(names: &BTreeSet<String>) -> String {
    names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Format a summary after every archive of a run was processed.
#[must_use]
pub fn summary_message(succeeded: usize, total: usize) -> String {
    let plural = if total == 1 { "archive" } else { "archives" };
    format!("Installed {succeeded} of {total} {plural}.")
}

/// Format the rule table for human-readable output.
///
/// # Examples
///
/// ```
/// use navdrop_installer::output::format_rules_human;
/// use navdrop_installer::rules::RuleTable;
///
/// let output = format_rules_human(&RuleTable::new());
/// assert!(output.contains("No rules configured"));
/// ```
#[must_use]
pub fn format_rules_human(rules: &RuleTable) -> String {
    if rules.is_empty() {
        return String::from(
            "No rules configured.\n\nAdd one with `navdrop-installer rules add <NAME> <DEST>`.",
        );
    }

    let width = rules
        .iter()
        .map(|rule| rule.name.chars().count())
        .max()
        .unwrap_or_default();
    let mut output = String::from("Rules:\n");
    for rule in rules {
        let _ = writeln!(output, "  {:<width$}  ->  {}", rule.name, rule.destination);
    }
    output
}

/// Format the rule table as JSON.
///
/// # Examples
///
/// ```
/// use navdrop_installer::output::format_rules_json;
/// use navdrop_installer::rules::RuleTable;
///
/// let json = format_rules_json(&RuleTable::new());
/// assert!(json.contains("\"rules\""));
/// ```
#[must_use]
pub fn format_rules_json(rules: &RuleTable) -> String {
    let json_data = RulesJson {
        rules: rules.iter().collect(),
    };
    serde_json::to_string_pretty(&json_data).unwrap_or_else(|_| "{}".to_owned())
}

/// JSON-serializable view of the rule table.
#[derive(Debug, Serialize)]
struct RulesJson<'a> {
    rules: Vec<&'a Rule>,
}

/// Format settings for display.
#[must_use]
pub fn format_settings(settings: &Settings, config_path: &Utf8Path) -> String {
    let availability = if settings.archiver_available() {
        ""
    } else {
        " (not found)"
    };
    format!(
        concat!(
            "Configuration: {}\n",
            "  archiver_path       = {}{}\n",
            "  auto_delete_archive = {}"
        ),
        config_path, settings.archiver_path, availability, settings.auto_delete_archive
    )
}
