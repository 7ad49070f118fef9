//! navdrop installer CLI entrypoint.
//!
//! This binary installs the nested sub-packages of dropped archives into
//! the directories named by the user's rules, and edits those rules and the
//! installer settings.

use clap::Parser;
use navdrop_installer::archiver::CommandExtractor;
use navdrop_installer::cli::{Cli, Command};
use navdrop_installer::config::{ConfigOrigin, LoadedConfig, load_or_init, resolve_config_path};
use navdrop_installer::dirs::SystemBaseDirs;
use navdrop_installer::error::Result;
use navdrop_installer::install::{InstallContext, run_install};
use navdrop_installer::manage::{CommandIo, run_rules, run_settings};
use navdrop_installer::output::{
    error_chain, format_rules_human, format_settings, write_stderr_line,
};
use std::io::{BufRead, Write};

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if cli.wait {
        wait_for_enter(&mut std::io::stdin().lock(), &mut stderr);
    }
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Runs the requested command; `Ok(false)` means an archive did not install.
fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<bool> {
    let dirs = SystemBaseDirs::new();
    let config_path = resolve_config_path(cli.config.as_deref(), &dirs)?;
    let mut loaded = load_or_init(&config_path)?;
    if !cli.quiet {
        report_config_origin(&loaded, stderr);
    }

    match &cli.command {
        Some(Command::Rules(args)) => {
            let mut io = CommandIo {
                stdout,
                stderr,
                quiet: cli.quiet,
            };
            run_rules(&mut loaded, &args.action, &mut io)?;
            Ok(true)
        }
        Some(Command::Settings(args)) => {
            let mut io = CommandIo {
                stdout,
                stderr,
                quiet: cli.quiet,
            };
            run_settings(&mut loaded, &args.action, &mut io)?;
            Ok(true)
        }
        Some(Command::Install(_)) | None => Ok(install(cli, &loaded, stderr)),
    }
}

/// Installs every archive given on the command line.
fn install(cli: &Cli, loaded: &LoadedConfig, stderr: &mut dyn Write) -> bool {
    let archives = &cli.install_args().archives;
    if archives.is_empty() {
        print_overview(loaded, stderr);
        return true;
    }

    let settings = &loaded.config.settings;
    let extractor = CommandExtractor::new(settings.archiver_path.as_std_path());
    let context = InstallContext {
        settings,
        rules: &loaded.config.rules,
        quiet: cli.quiet,
    };
    run_install(&context, archives, &extractor, stderr).all_succeeded()
}

/// Mentions a configuration file that was just written on the user's behalf.
fn report_config_origin(loaded: &LoadedConfig, stderr: &mut dyn Write) {
    match loaded.origin {
        ConfigOrigin::Existing => {}
        ConfigOrigin::Created => write_stderr_line(
            stderr,
            format!("Created default configuration at {}", loaded.path),
        ),
        ConfigOrigin::Upgraded => write_stderr_line(
            stderr,
            format!("Upgraded configuration at {} to the current layout", loaded.path),
        ),
    }
}

/// Shown when the binary is started without archives, e.g. double-clicked.
fn print_overview(loaded: &LoadedConfig, stderr: &mut dyn Write) {
    write_stderr_line(stderr, format_settings(&loaded.config.settings, &loaded.path));
    write_stderr_line(stderr, "");
    write_stderr_line(stderr, format_rules_human(&loaded.config.rules).trim_end());
    write_stderr_line(stderr, "");
    write_stderr_line(
        stderr,
        "Drop archives onto navdrop-installer to install them, or run `navdrop-installer --help`.",
    );
}

fn wait_for_enter(stdin: &mut dyn BufRead, stderr: &mut dyn Write) {
    write_stderr_line(stderr, "Press Enter to exit...");
    let mut line = String::new();
    if stdin.read_line(&mut line).is_err() {
        // Nothing to wait for when stdin is closed.
    }
}

fn exit_code_for_run_result(result: Result<bool>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {}", error_chain(&err)));
            1
        }
    }
}
