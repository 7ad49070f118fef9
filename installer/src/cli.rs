//! CLI argument definitions for the navdrop installer.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use camino::Utf8PathBuf;
use clap::{ArgGroup, Args, Parser, Subcommand};
use log::LevelFilter;

/// Install nested sub-packages from dropped archives into configured folders.
#[derive(Parser, Debug)]
#[command(name = "navdrop-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install nested sub-packages from dropped archives into configured folders.\n\n",
    "Each archive is extracted with the configured archiver. Every nested .zip ",
    "whose name (without extension) matches a rule is extracted in turn and ",
    "merged into that rule's destination, overwriting same-named files. A single ",
    "wrapping folder inside a sub-package is stripped.\n\n",
    "Drop archives onto the executable, or pass them as arguments.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install every matching sub-package from an archive:\n",
    "    $ navdrop-installer NavData-2405.zip\n\n",
    "  Route NavDataXP12.zip into an X-Plane installation:\n",
    "    $ navdrop-installer rules add NavDataXP12 \"/games/X-Plane 12/Custom Data\"\n\n",
    "  Use 7-Zip and keep archives after installing:\n",
    "    $ navdrop-installer settings set --archiver /usr/bin/7z --auto-delete false\n\n",
    "  Keep the console open after a drag-and-drop install:\n",
    "    $ navdrop-installer --wait NavData-2405.zip",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Install arguments (used when no subcommand is given).
    #[command(flatten)]
    pub install: InstallArgs,

    /// Configuration file [default: platform-specific, or $NAVDROP_CONFIG].
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Wait for Enter before exiting.
    #[arg(long, global = true)]
    pub wait: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Install sub-packages from archives (default when archives are given).
    Install(InstallArgs),

    /// Inspect or edit the sub-package routing rules.
    Rules(RulesArgs),

    /// Inspect or edit installer settings.
    Settings(SettingsArgs),
}

/// Arguments for the install command.
#[derive(Args, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Archives to install (.zip, .rar or .7z).
    #[arg(value_name = "ARCHIVE")]
    pub archives: Vec<Utf8PathBuf>,
}

/// Arguments for the rules command.
#[derive(Args, Debug, Clone)]
pub struct RulesArgs {
    /// Rule operation to perform.
    #[command(subcommand)]
    pub action: RulesAction,
}

/// Operations on the rule table.
#[derive(Subcommand, Debug, Clone)]
pub enum RulesAction {
    /// List rules in the order they were added.
    List(RulesListArgs),

    /// Add a rule, or change the destination of an existing one.
    Add(RuleAddArgs),

    /// Remove a rule.
    Remove(RuleRemoveArgs),
}

/// Arguments for `rules list`.
#[derive(Args, Debug, Clone, Default)]
pub struct RulesListArgs {
    /// Output in JSON format for scripting.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `rules add`.
#[derive(Args, Debug, Clone)]
pub struct RuleAddArgs {
    /// Sub-package name: the nested archive's file name without extension.
    pub name: String,

    /// Directory the sub-package is merged into.
    pub destination: Utf8PathBuf,
}

/// Arguments for `rules remove`.
#[derive(Args, Debug, Clone)]
pub struct RuleRemoveArgs {
    /// Name of the rule to remove.
    pub name: String,
}

/// Arguments for the settings command.
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Settings operation to perform.
    #[command(subcommand)]
    pub action: SettingsAction,
}

/// Operations on installer settings.
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsAction {
    /// Show the current settings and configuration file location.
    Show,

    /// Change one or more settings.
    Set(SettingsSetArgs),
}

/// Arguments for `settings set`.
#[derive(Args, Debug, Clone, Default)]
#[command(group(
    ArgGroup::new("changes")
        .required(true)
        .multiple(true)
        .args(["archiver", "auto_delete"])
))]
pub struct SettingsSetArgs {
    /// Path of the archiver executable (Bandizip or 7-Zip).
    #[arg(long, value_name = "PATH")]
    pub archiver: Option<Utf8PathBuf>,

    /// Delete archives after every sub-package installed cleanly.
    #[arg(long, value_name = "BOOL")]
    pub auto_delete: Option<bool>,
}

impl Cli {
    /// Returns the effective install arguments.
    ///
    /// If an `Install` subcommand was provided, returns those arguments.
    /// Otherwise returns the flattened top-level arguments, which are empty
    /// when another subcommand is active.
    #[must_use]
    pub fn install_args(&self) -> &InstallArgs {
        match &self.command {
            Some(Command::Install(args)) => args,
            Some(Command::Rules(_) | Command::Settings(_)) | None => &self.install,
        }
    }

    /// Log level implied by `--quiet` and the `-v` count.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use log::LevelFilter;
    /// use navdrop_installer::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["navdrop-installer", "-vv"]);
    /// assert_eq!(cli.log_level(), LevelFilter::Debug);
    /// ```
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
