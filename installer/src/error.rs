//! Error types for the navdrop installer CLI.
//!
//! This module defines the crate-level error returned by configuration and
//! command handling. Errors that belong to a single sub-package (extraction or
//! merge failures) live next to the code that raises them and never abort a
//! whole run; see [`crate::pipeline::SubPackageError`].

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while loading configuration or running a command.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// No configuration directory could be resolved for the current user.
    #[error("could not determine configuration directory; pass --config or set NAVDROP_CONFIG")]
    ConfigDirUnavailable,

    /// The configuration file exists but could not be read.
    #[error("failed to read configuration {path}")]
    ConfigRead {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has the wrong shape.
    #[error("invalid configuration {path}: {reason}")]
    ConfigParse {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// The configuration file could not be written.
    #[error("failed to write configuration {path}")]
    ConfigWrite {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Another process holds the configuration lock.
    #[error("configuration {path} is locked by another process")]
    ConfigLocked {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The archiver executable given on the command line does not exist.
    #[error("archiver executable not found at {path}")]
    ArchiverNotFound {
        /// The rejected path.
        path: Utf8PathBuf,
    },

    /// No rule with the given name exists.
    #[error("no rule named {name:?}")]
    RuleNotFound {
        /// The requested rule name.
        name: String,
    },

    /// A rule could not be added.
    #[error("invalid rule: {reason}")]
    InvalidRule {
        /// Why the rule was rejected.
        reason: String,
    },

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
