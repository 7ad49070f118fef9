//! Tests for installer CLI parsing and default behaviours.

use super::*;
use clap::CommandFactory;
use rstest::rstest;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn cli_parses_defaults() {
    let cli = Cli::parse_from(["navdrop-installer"]);
    assert!(cli.command.is_none());
    assert!(cli.install.archives.is_empty());
    assert!(cli.config.is_none());
    assert_eq!(cli.verbosity, 0);
    assert!(!cli.quiet);
    assert!(!cli.wait);
}

#[test]
fn cli_parses_dropped_archives_without_subcommand() {
    let cli = Cli::parse_from([
        "navdrop-installer",
        "/downloads/NavData 2405.zip",
        "/downloads/extras.7z",
    ]);
    assert!(cli.command.is_none());
    assert_eq!(
        cli.install_args().archives,
        vec![
            Utf8PathBuf::from("/downloads/NavData 2405.zip"),
            Utf8PathBuf::from("/downloads/extras.7z"),
        ]
    );
}

#[test]
fn install_args_returns_subcommand_args_when_present() {
    let cli = Cli::parse_from(["navdrop-installer", "install", "pack.rar"]);
    assert!(matches!(cli.command, Some(Command::Install(_))));
    assert_eq!(
        cli.install_args().archives,
        vec![Utf8PathBuf::from("pack.rar")]
    );
}

#[test]
fn cli_parses_rules_list_with_json() {
    let cli = Cli::parse_from(["navdrop-installer", "rules", "list", "--json"]);
    match cli.command {
        Some(Command::Rules(RulesArgs {
            action: RulesAction::List(args),
        })) => assert!(args.json),
        other => panic!("expected rules list, got {other:?}"),
    }
}

#[test]
fn cli_parses_rules_add() {
    let cli = Cli::parse_from([
        "navdrop-installer",
        "rules",
        "add",
        "FENIX A320",
        "/games/msfs/fenix",
    ]);
    match cli.command {
        Some(Command::Rules(RulesArgs {
            action: RulesAction::Add(args),
        })) => {
            assert_eq!(args.name, "FENIX A320");
            assert_eq!(args.destination, Utf8PathBuf::from("/games/msfs/fenix"));
        }
        other => panic!("expected rules add, got {other:?}"),
    }
}

#[test]
fn cli_parses_rules_remove() {
    let cli = Cli::parse_from(["navdrop-installer", "rules", "remove", "X-Plane 12"]);
    match cli.command {
        Some(Command::Rules(RulesArgs {
            action: RulesAction::Remove(args),
        })) => assert_eq!(args.name, "X-Plane 12"),
        other => panic!("expected rules remove, got {other:?}"),
    }
}

#[test]
fn cli_parses_settings_set() {
    let cli = Cli::parse_from([
        "navdrop-installer",
        "settings",
        "set",
        "--archiver",
        "/usr/bin/7z",
        "--auto-delete",
        "false",
    ]);
    match cli.command {
        Some(Command::Settings(SettingsArgs {
            action: SettingsAction::Set(args),
        })) => {
            assert_eq!(args.archiver, Some(Utf8PathBuf::from("/usr/bin/7z")));
            assert_eq!(args.auto_delete, Some(false));
        }
        other => panic!("expected settings set, got {other:?}"),
    }
}

#[test]
fn cli_parses_settings_show() {
    let cli = Cli::parse_from(["navdrop-installer", "settings", "show"]);
    assert!(matches!(
        cli.command,
        Some(Command::Settings(SettingsArgs {
            action: SettingsAction::Show
        }))
    ));
}

#[rstest]
#[case::leading(&["navdrop-installer", "--config", "/tmp/n.toml", "rules", "list"])]
#[case::trailing(&["navdrop-installer", "rules", "list", "--config", "/tmp/n.toml"])]
#[case::install(&["navdrop-installer", "install", "--config", "/tmp/n.toml", "a.zip"])]
fn global_config_flag_is_accepted_anywhere(#[case] args: &[&str]) {
    let cli = Cli::parse_from(args);
    assert_eq!(cli.config, Some(Utf8PathBuf::from("/tmp/n.toml")));
}

/// Parameterised tests for boolean CLI flags.
#[rstest]
#[case::quiet(&["navdrop-installer", "-q"], |cli: &Cli| cli.quiet)]
#[case::wait(&["navdrop-installer", "--wait", "a.zip"], |cli: &Cli| cli.wait)]
#[case::verbose(&["navdrop-installer", "-v"], |cli: &Cli| cli.verbosity > 0)]
#[case::wait_after_subcommand(&["navdrop-installer", "settings", "show", "--wait"], |cli: &Cli| cli.wait)]
fn cli_parses_boolean_flags(#[case] args: &[&str], #[case] check: fn(&Cli) -> bool) {
    let cli = Cli::parse_from(args);
    assert!(check(&cli));
}

#[rstest]
#[case::verbose_with_quiet(&["navdrop-installer", "--verbose", "--quiet"])]
#[case::settings_set_without_changes(&["navdrop-installer", "settings", "set"])]
#[case::auto_delete_not_a_bool(&["navdrop-installer", "settings", "set", "--auto-delete", "maybe"])]
#[case::rules_add_missing_destination(&["navdrop-installer", "rules", "add", "NavData"])]
#[case::rules_without_action(&["navdrop-installer", "rules"])]
fn cli_rejects_invalid_invocations(#[case] args: &[&str]) {
    Cli::try_parse_from(args).expect_err("expected clap to reject the invocation");
}

/// Parameterised tests for the log level mapping.
#[rstest]
#[case::default(&["navdrop-installer"], LevelFilter::Warn)]
#[case::single(&["navdrop-installer", "-v"], LevelFilter::Info)]
#[case::double(&["navdrop-installer", "-vv"], LevelFilter::Debug)]
#[case::triple(&["navdrop-installer", "-vvv"], LevelFilter::Trace)]
#[case::many(&["navdrop-installer", "-vvvvv"], LevelFilter::Trace)]
#[case::quiet(&["navdrop-installer", "-q"], LevelFilter::Error)]
fn log_level_follows_verbosity(#[case] args: &[&str], #[case] expected: LevelFilter) {
    let cli = Cli::parse_from(args);
    assert_eq!(cli.log_level(), expected);
}
