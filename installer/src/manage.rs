//! The `rules` and `settings` commands.
//!
//! These are the only code paths that write configuration. Listings go to
//! `stdout` so they can be piped; confirmations go to `stderr`.

use crate::cli::{RuleAddArgs, RuleRemoveArgs, RulesAction, SettingsAction, SettingsSetArgs};
use crate::config::{LoadedConfig, save};
use crate::error::{InstallerError, Result};
use crate::output::{format_rules_human, format_rules_json, format_settings, write_stderr_line};
use std::io::Write;

/// Output streams and verbosity for a configuration command.
pub struct CommandIo<'a> {
    /// Destination for listings.
    pub stdout: &'a mut dyn Write,
    /// Destination for confirmations.
    pub stderr: &'a mut dyn Write,
    /// Suppress confirmations.
    pub quiet: bool,
}

impl CommandIo<'_> {
    fn print(&mut self, text: &str) -> Result<()> {
        writeln!(self.stdout, "{}", text.trim_end())
            .map_err(|source| InstallerError::WriteFailed { source })
    }

    fn confirm(&mut self, message: impl std::fmt::Display) {
        if !self.quiet {
            write_stderr_line(self.stderr, message);
        }
    }
}

/// Run a `rules` subcommand against `loaded`, saving any change.
///
/// # Errors
///
/// Returns an error if the rule is invalid or unknown, or if output or the
/// configuration file cannot be written.
pub fn run_rules(
    loaded: &mut LoadedConfig,
    action: &RulesAction,
    io: &mut CommandIo<'_>,
) -> Result<()> {
    match action {
        RulesAction::List(args) => {
            let text = if args.json {
                format_rules_json(&loaded.config.rules)
            } else {
                format_rules_human(&loaded.config.rules)
            };
            io.print(&text)
        }
        RulesAction::Add(args) => add_rule(loaded, args, io),
        RulesAction::Remove(args) => remove_rule(loaded, args, io),
    }
}

fn add_rule(loaded: &mut LoadedConfig, args: &RuleAddArgs, io: &mut CommandIo<'_>) -> Result<()> {
    validate_rule_name(&args.name)?;
    if args.destination.as_str().trim().is_empty() {
        return Err(InstallerError::InvalidRule {
            reason: "destination must not be empty".to_owned(),
        });
    }

    let previous = loaded
        .config
        .rules
        .insert(args.name.clone(), args.destination.clone());
    save(&loaded.path, &loaded.config)?;

    match previous {
        Some(old) => io.confirm(format!(
            "Updated rule {:?}: {old} -> {}",
            args.name, args.destination
        )),
        None => io.confirm(format!(
            "Added rule {:?} -> {}",
            args.name, args.destination
        )),
    }
    Ok(())
}

fn remove_rule(
    loaded: &mut LoadedConfig,
    args: &RuleRemoveArgs,
    io: &mut CommandIo<'_>,
) -> Result<()> {
    if loaded.config.rules.remove(&args.name).is_none() {
        return Err(InstallerError::RuleNotFound {
            name: args.name.clone(),
        });
    }
    save(&loaded.path, &loaded.config)?;
    io.confirm(format!("Removed rule {:?}", args.name));
    Ok(())
}

/// Reject names that can never equal a nested archive's base name.
fn validate_rule_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        "name must not be empty"
    } else if name.contains(['/', '\\']) {
        "name must be a file name without directories"
    } else if std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    {
        "name must not include the .zip extension"
    } else {
        return Ok(());
    };
    Err(InstallerError::InvalidRule {
        reason: reason.to_owned(),
    })
}

/// Run a `settings` subcommand against `loaded`, saving any change.
///
/// # Errors
///
/// Returns [`InstallerError::ArchiverNotFound`] if a new archiver path does
/// not name an existing file, or an error if output or the configuration
/// file cannot be written.
pub fn run_settings(
    loaded: &mut LoadedConfig,
    action: &SettingsAction,
    io: &mut CommandIo<'_>,
) -> Result<()> {
    match action {
        SettingsAction::Show => {
            let text = format_settings(&loaded.config.settings, &loaded.path);
            io.print(&text)
        }
        SettingsAction::Set(args) => set_settings(loaded, args, io),
    }
}

fn set_settings(
    loaded: &mut LoadedConfig,
    args: &SettingsSetArgs,
    io: &mut CommandIo<'_>,
) -> Result<()> {
    if let Some(path) = &args.archiver {
        if !path.is_file() {
            return Err(InstallerError::ArchiverNotFound { path: path.clone() });
        }
    }

    let settings = &mut loaded.config.settings;
    if let Some(path) = &args.archiver {
        settings.archiver_path = path.clone();
    }
    if let Some(auto_delete) = args.auto_delete {
        settings.auto_delete_archive = auto_delete;
    }
    save(&loaded.path, &loaded.config)?;

    io.confirm(format!("Saved settings to {}", loaded.path));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::RulesListArgs;
    use crate::config::{Config, ConfigOrigin, load_or_init};
    use camino::{Utf8Path, Utf8PathBuf};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct ManageTestContext {
        _temp_dir: TempDir,
        root: Utf8PathBuf,
        loaded: LoadedConfig,
    }

    impl ManageTestContext {
        fn rules(&mut self, action: &RulesAction) -> (Result<()>, String, String) {
            let mut stdout = Vec::new();
            let mut stderr = Vec::new();
            let result = run_rules(
                &mut self.loaded,
                action,
                &mut CommandIo {
                    stdout: &mut stdout,
                    stderr: &mut stderr,
                    quiet: false,
                },
            );
            (result, lossy(&stdout), lossy(&stderr))
        }

        fn settings(&mut self, action: &SettingsAction) -> (Result<()>, String) {
            let mut stdout = Vec::new();
            let mut stderr = Vec::new();
            let result = run_settings(
                &mut self.loaded,
                action,
                &mut CommandIo {
                    stdout: &mut stdout,
                    stderr: &mut stderr,
                    quiet: true,
                },
            );
            assert!(stderr.is_empty(), "quiet mode must not confirm");
            (result, lossy(&stdout))
        }

        fn reload(&self) -> Config {
            let reloaded = load_or_init(&self.loaded.path).expect("reload");
            assert_eq!(reloaded.origin, ConfigOrigin::Existing);
            reloaded.config
        }
    }

    fn lossy(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[fixture]
    fn context() -> ManageTestContext {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let root = Utf8PathBuf::try_from(temp_dir.path().to_owned()).expect("non-UTF8 temp path");
        let loaded = load_or_init(&root.join("navdrop.toml")).expect("init config");
        ManageTestContext {
            _temp_dir: temp_dir,
            root,
            loaded,
        }
    }

    fn add(name: &str, destination: &str) -> RulesAction {
        RulesAction::Add(RuleAddArgs {
            name: name.to_owned(),
            destination: Utf8PathBuf::from(destination),
        })
    }

    #[rstest]
    fn add_appends_and_persists(mut context: ManageTestContext) {
        let (result, _, stderr) = context.rules(&add("NavDataXP12", "/games/xp12"));

        result.expect("add rule");
        assert!(stderr.contains("Added rule \"NavDataXP12\""));
        let names: Vec<String> = context
            .reload()
            .rules
            .iter()
            .map(|rule| rule.name.clone())
            .collect();
        assert_eq!(names, vec!["X-Plane 12", "FENIX A320", "NavDataXP12"]);
    }

    #[rstest]
    fn add_existing_name_updates_destination(mut context: ManageTestContext) {
        let (result, _, stderr) = context.rules(&add("X-Plane 12", "/games/xp12"));

        result.expect("update rule");
        assert!(stderr.contains("Updated rule"));
        let config = context.reload();
        assert_eq!(config.rules.len(), 2);
        assert_eq!(
            config.rules.destination("X-Plane 12"),
            Some(Utf8Path::new("/games/xp12"))
        );
    }

    #[rstest]
    #[case::empty("  ")]
    #[case::separator("xp12/NavData")]
    #[case::backslash(r"xp12\NavData")]
    #[case::extension("NavDataXP12.ZIP")]
    fn add_rejects_unmatchable_names(mut context: ManageTestContext, #[case] name: &str) {
        let (result, _, _) = context.rules(&add(name, "/games/xp12"));

        assert!(matches!(result, Err(InstallerError::InvalidRule { .. })));
        assert_eq!(context.reload().rules.len(), 2);
    }

    #[rstest]
    fn remove_unknown_rule_is_an_error(mut context: ManageTestContext) {
        let action = RulesAction::Remove(RuleRemoveArgs {
            name: "x-plane 12".to_owned(),
        });

        let (result, _, _) = context.rules(&action);

        assert!(matches!(result, Err(InstallerError::RuleNotFound { ref name }) if name == "x-plane 12"));
    }

    #[rstest]
    fn remove_deletes_and_persists(mut context: ManageTestContext) {
        let action = RulesAction::Remove(RuleRemoveArgs {
            name: "X-Plane 12".to_owned(),
        });

        let (result, _, _) = context.rules(&action);

        result.expect("remove rule");
        assert!(!context.reload().rules.contains("X-Plane 12"));
    }

    #[rstest]
    #[case::human(false, "Rules:")]
    #[case::json(true, "\"rules\"")]
    fn list_writes_to_stdout(
        mut context: ManageTestContext,
        #[case] json: bool,
        #[case] marker: &str,
    ) {
        let (result, stdout, stderr) =
            context.rules(&RulesAction::List(RulesListArgs { json }));

        result.expect("list rules");
        assert!(stdout.contains(marker));
        assert!(stdout.contains("FENIX A320"));
        assert!(stderr.is_empty());
    }

    #[rstest]
    fn settings_set_rejects_missing_archiver(mut context: ManageTestContext) {
        let missing = context.root.join("missing-7z");
        let action = SettingsAction::Set(SettingsSetArgs {
            archiver: Some(missing.clone()),
            auto_delete: Some(false),
        });

        let (result, _) = context.settings(&action);

        assert!(matches!(result, Err(InstallerError::ArchiverNotFound { ref path }) if *path == missing));
        assert!(context.reload().settings.auto_delete_archive, "nothing saved");
    }

    #[rstest]
    fn settings_set_persists_changes(mut context: ManageTestContext) {
        let archiver = context.root.join("7z");
        std::fs::write(&archiver, b"").expect("write fake archiver");
        let action = SettingsAction::Set(SettingsSetArgs {
            archiver: Some(archiver.clone()),
            auto_delete: Some(false),
        });

        let (result, _) = context.settings(&action);

        result.expect("set settings");
        let settings = context.reload().settings;
        assert_eq!(settings.archiver_path, archiver);
        assert!(!settings.auto_delete_archive);
    }

    #[rstest]
    fn settings_show_prints_path(mut context: ManageTestContext) {
        let (result, stdout) = context.settings(&SettingsAction::Show);

        result.expect("show settings");
        assert!(stdout.contains(context.loaded.path.as_str()));
        assert!(stdout.contains("auto_delete_archive = true"));
    }
}
