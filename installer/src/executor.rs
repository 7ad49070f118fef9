//! External process execution.
//!
//! The archiver is a third-party executable; running it goes through
//! [`CommandExecutor`] so tests can script its behaviour.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs `program` with `args` to completion and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use navdrop_installer::executor::{CommandExecutor, SystemCommandExecutor};
    /// use std::path::Path;
    ///
    /// let executor = SystemCommandExecutor;
    /// let output = executor.run(Path::new("7z"), &["i".into()])?;
    /// assert!(output.status.success());
    /// # Ok::<(), std::io::Error>(())
    /// ```
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<Output>;
}

/// Executes commands on the host system.
///
/// Standard input is closed so an archiver that prompts (for a password, or
/// before overwriting) fails instead of blocking forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, program: &Path, args: &[OsString]) -> io::Result<Output> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
    }
}
