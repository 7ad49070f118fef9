//! Persistent settings and rule table.
//!
//! The configuration lives in a TOML file with two tables:
//!
//! ```toml
//! [settings]
//! archiver_path = "C:\\Program Files\\Bandizip\\Bandizip.exe"
//! auto_delete_archive = true
//!
//! [rules]
//! "X-Plane 12" = "D:\\X-Plane 12\\Custom Data"
//! ```
//!
//! The file is created with defaults on first use. Files written by older
//! releases keep the archiver path under `[paths]`; those are upgraded in
//! place when loaded. The distribution pipeline never writes configuration;
//! only the `rules` and `settings` subcommands do.

use crate::dirs::BaseDirs;
use crate::error::{InstallerError, Result};
use crate::rules::RuleTable;
use camino::{Utf8Path, Utf8PathBuf};
use fs2::FileExt;
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// File name of the configuration inside the configuration directory.
pub const CONFIG_FILENAME: &str = "navdrop.toml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "NAVDROP_CONFIG";

/// Archiver location written into a freshly created configuration.
#[cfg(windows)]
pub const DEFAULT_ARCHIVER_PATH: &str = r"C:\Program Files\Bandizip\Bandizip.exe";

/// Archiver location written into a freshly created configuration.
#[cfg(not(windows))]
pub const DEFAULT_ARCHIVER_PATH: &str = "/usr/bin/7z";

/// User settings consumed by the install command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Path of the external archiver executable.
    pub archiver_path: Utf8PathBuf,
    /// Delete the dropped archive once its sub-packages were distributed.
    pub auto_delete_archive: bool,
}

impl Settings {
    /// Returns true when the configured archiver executable exists.
    #[must_use]
    pub fn archiver_available(&self) -> bool {
        self.archiver_path.is_file()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            archiver_path: Utf8PathBuf::from(DEFAULT_ARCHIVER_PATH),
            auto_delete_archive: true,
        }
    }
}

/// Complete configuration: settings plus rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Archiver and clean-up settings.
    pub settings: Settings,
    /// Sub-package routing rules.
    pub rules: RuleTable,
}

impl Config {
    /// Configuration written on first run, with two example rules.
    #[must_use]
    pub fn with_defaults() -> Self {
        let rules = [
            ("X-Plane 12", r"D:\X-Plane 12\Custom Data"),
            (
                "FENIX A320",
                r"D:\Games\MSFS\Community\fnx-aircraft-320\NavData",
            ),
        ]
        .into_iter()
        .collect();
        Self {
            settings: Settings::default(),
            rules,
        }
    }
}

/// How a configuration came to be in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Read from an existing file.
    Existing,
    /// No file existed; defaults were written.
    Created,
    /// A legacy file was read and rewritten in the current layout.
    Upgraded,
}

/// A loaded configuration together with where it lives.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The configuration values.
    pub config: Config,
    /// Path of the backing file.
    pub path: Utf8PathBuf,
    /// Whether the file was read, created, or upgraded.
    pub origin: ConfigOrigin,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    settings: Option<RawSettings>,
    paths: Option<LegacyPaths>,
    #[serde(default)]
    rules: toml::Table,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    archiver_path: Option<Utf8PathBuf>,
    #[serde(default = "default_auto_delete")]
    auto_delete_archive: bool,
}

#[derive(Debug, Deserialize)]
struct LegacyPaths {
    #[serde(alias = "bandizip_path")]
    archiver_path: Option<Utf8PathBuf>,
}

#[derive(Debug, Serialize)]
struct ConfigDocument<'a> {
    settings: SettingsDocument<'a>,
    rules: toml::Table,
}

#[derive(Debug, Serialize)]
struct SettingsDocument<'a> {
    archiver_path: &'a Utf8Path,
    auto_delete_archive: bool,
}

fn default_auto_delete() -> bool {
    true
}

/// Resolve the configuration file path.
///
/// Precedence: the explicit `cli_override`, then the `NAVDROP_CONFIG`
/// environment variable, then `<config_dir>/navdrop.toml`.
///
/// # Errors
///
/// Returns [`InstallerError::ConfigDirUnavailable`] when neither override is
/// set and no configuration directory can be resolved as UTF-8.
pub fn resolve_config_path(
    cli_override: Option<&Utf8Path>,
    dirs: &dyn BaseDirs,
) -> Result<Utf8PathBuf> {
    if let Some(path) = cli_override {
        return Ok(path.to_owned());
    }
    if let Some(value) = std::env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()) {
        return Utf8PathBuf::try_from(std::path::PathBuf::from(value))
            .map_err(|_| InstallerError::ConfigDirUnavailable);
    }
    dirs.config_dir()
        .and_then(|dir| Utf8PathBuf::try_from(dir).ok())
        .map(|dir| dir.join(CONFIG_FILENAME))
        .ok_or(InstallerError::ConfigDirUnavailable)
}

/// Load the configuration at `path`, creating or upgrading it as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or (when created or
/// upgraded) written back.
pub fn load_or_init(path: &Utf8Path) -> Result<LoadedConfig> {
    if !path.exists() {
        debug!("no configuration at {path}; writing defaults");
        let config = Config::with_defaults();
        save(path, &config)?;
        return Ok(LoadedConfig {
            config,
            path: path.to_owned(),
            origin: ConfigOrigin::Created,
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|source| InstallerError::ConfigRead {
        path: path.to_owned(),
        source,
    })?;
    let (config, upgraded) =
        parse_config(&contents).map_err(|reason| InstallerError::ConfigParse {
            path: path.to_owned(),
            reason,
        })?;

    let origin = if upgraded {
        debug!("upgrading legacy configuration at {path}");
        save(path, &config)?;
        ConfigOrigin::Upgraded
    } else {
        ConfigOrigin::Existing
    };

    Ok(LoadedConfig {
        config,
        path: path.to_owned(),
        origin,
    })
}

/// Parse configuration text.
///
/// Returns the configuration and whether it came from the legacy layout (no
/// `[settings]` table).
///
/// # Errors
///
/// Returns a description of the problem when the text is not valid TOML or a
/// rule destination is not a string.
pub fn parse_config(contents: &str) -> std::result::Result<(Config, bool), String> {
    let raw: RawConfig = toml::from_str(contents).map_err(|e| e.to_string())?;

    let mut rules = RuleTable::new();
    for (name, value) in raw.rules {
        let toml::Value::String(destination) = value else {
            return Err(format!("rule {name:?} must map to a directory path string"));
        };
        rules.insert(name, destination);
    }

    let (settings, upgraded) = match raw.settings {
        Some(settings) => (
            Settings {
                archiver_path: settings
                    .archiver_path
                    .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_ARCHIVER_PATH)),
                auto_delete_archive: settings.auto_delete_archive,
            },
            false,
        ),
        None => {
            let archiver_path = raw
                .paths
                .and_then(|paths| paths.archiver_path)
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_ARCHIVER_PATH));
            (
                Settings {
                    archiver_path,
                    auto_delete_archive: true,
                },
                true,
            )
        }
    };

    Ok((Config { settings, rules }, upgraded))
}

/// Render a configuration as TOML text.
///
/// # Errors
///
/// Returns the serializer's message if rendering fails.
pub fn render_config(config: &Config) -> std::result::Result<String, String> {
    let rules = config
        .rules
        .iter()
        .map(|rule| {
            (
                rule.name.clone(),
                toml::Value::String(rule.destination.to_string()),
            )
        })
        .collect();
    let document = ConfigDocument {
        settings: SettingsDocument {
            archiver_path: &config.settings.archiver_path,
            auto_delete_archive: config.settings.auto_delete_archive,
        },
        rules,
    };
    toml::to_string(&document).map_err(|e| e.to_string())
}

/// Write `config` to `path` under an exclusive advisory lock.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns [`InstallerError::ConfigLocked`] if another process holds the
/// lock, or [`InstallerError::ConfigWrite`] on any I/O failure.
pub fn save(path: &Utf8Path, config: &Config) -> Result<()> {
    let write_err = |source: std::io::Error| InstallerError::ConfigWrite {
        path: path.to_owned(),
        source,
    };
    let text = render_config(config).map_err(|reason| InstallerError::ConfigParse {
        path: path.to_owned(),
        reason,
    })?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(write_err)?;
    FileExt::try_lock_exclusive(&file).map_err(|source| InstallerError::ConfigLocked {
        path: path.to_owned(),
        source,
    })?;

    // The lock is released when `file` is dropped.
    file.set_len(0).map_err(write_err)?;
    file.write_all(text.as_bytes()).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
