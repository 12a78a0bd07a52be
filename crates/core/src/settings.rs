//! Application settings.
//!
//! Settings live in a single TOML file with kebab-case keys. Every section is
//! optional and falls back to its defaults:
//!
//! ```toml
//! [logging]
//! enabled = true
//! level = "info"
//! max-files = 3
//! directory = "logs"
//!
//! [navigation]
//! teardown-policy = "force-remove"
//!
//! [[panels]]
//! name = "home"
//! kind = "main"
//! ```

use crate::panel::PanelKind;
use anyhow::{Context, Error};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub logging: LoggingSettings,
    pub navigation: NavigationSettings,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub panels: Vec<PanelConfig>,
}

impl Settings {
    /// Loads settings from `path`, or returns the defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Settings::default());
        }

        load_toml(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        save_toml(self, path)
    }
}

/// Logging configuration, see [`crate::logging`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingSettings {
    pub enabled: bool,
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Number of run logs to keep, `0` keeps all of them.
    pub max_files: usize,
    /// Log directory, relative to the working directory.
    pub directory: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            enabled: true,
            level: "info".to_string(),
            max_files: 3,
            directory: PathBuf::from("logs"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NavigationSettings {
    pub teardown_policy: TeardownPolicy,
}

/// What to do when a normal panel or popup is torn down while it is still
/// on the navigation stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TeardownPolicy {
    /// Drop the entry from the stack. If it was the base layer, the next
    /// non-popup entry is shown again beneath any remaining popups.
    #[default]
    ForceRemove,
    /// Leave the stack alone and report a contract violation.
    Reject,
}

/// Declarative description of a panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PanelConfig {
    pub name: String,
    pub kind: PanelKind,
    pub hide_static_menu: bool,
}

pub fn load_toml<T, P: AsRef<Path>>(path: P) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let s = fs::read_to_string(path)
        .with_context(|| format!("can't read file {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("can't parse TOML content from {}", path.display()))
}

pub fn save_toml<T, P: AsRef<Path>>(data: &T, path: P) -> Result<(), Error>
where
    T: Serialize,
{
    let path = path.as_ref();
    let s = toml::to_string(data).context("can't convert to TOML format")?;
    fs::write(path, &s).with_context(|| format!("can't write to file {}", path.display()))
}
