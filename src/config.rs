//! Configuration file handling for tsrecon.
//!
//! The configuration file is stored at `$TSRECON_HOME/config.json`. It holds the category
//! selection to start from and the settings for exported reports. The file is optional: when it
//! does not exist every setting takes its default.

use crate::export::Exports;
use crate::render::Format;
use crate::{utils, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "tsrecon";
const CONFIG_VERSION: u8 = 1;
const EXPORT_COPIES: u32 = 5;
const EXPORTS: &str = "exports";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$TSRECON_HOME` and from there it loads `$TSRECON_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    exports: PathBuf,
}

impl Config {
    /// Creates the home directory, its exports directory and an initial `config.json` with
    /// default settings. An existing `config.json` is left untouched and loaded instead.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the tsrecon home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = if utils::exists(&config_path).await? {
            debug!("Keeping existing config file {}", config_path.display());
            ConfigFile::load(&config_path).await?
        } else {
            let config_file = ConfigFile::default();
            config_file.save(&config_path).await?;
            config_file
        };

        let config = Self::from_parts(root, config_path, config_file);
        utils::make_dir(&config.exports).await?;
        Ok(config)
    }

    /// Loads `$TSRECON_HOME/config.json`, falling back to defaults when the file (or the home
    /// directory itself) does not exist.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = if utils::exists(&maybe_relative).await? {
            utils::canonicalize(&maybe_relative).await?
        } else {
            maybe_relative
        };

        let config_path = root.join(CONFIG_JSON);
        let config_file = if config_path.is_file() {
            ConfigFile::load(&config_path).await?
        } else {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            ConfigFile::default()
        };
        Ok(Self::from_parts(root, config_path, config_file))
    }

    fn from_parts(root: PathBuf, config_path: PathBuf, config_file: ConfigFile) -> Self {
        let exports = if config_file.export_dir.is_absolute() {
            config_file.export_dir.clone()
        } else {
            root.join(&config_file.export_dir)
        };
        Self {
            root,
            config_path,
            config_file,
            exports,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The categories a session starts with, if configured.
    pub fn default_categories(&self) -> Option<&[String]> {
        self.config_file.default_categories.as_deref()
    }

    pub fn export_format(&self) -> Format {
        self.config_file.export_format
    }

    pub fn export_copies(&self) -> u32 {
        self.config_file.export_copies
    }

    /// The exports directory, resolved against the home directory when configured as relative.
    pub fn exports(&self) -> &Path {
        &self.exports
    }

    /// Creates a new `Exports` instance for writing report files.
    pub fn exporter(&self) -> Exports {
        Exports::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "tsrecon",
///   "config_version": 1,
///   "default_categories": ["REG", "OT"],
///   "export_format": "csv",
///   "export_copies": 5,
///   "export_dir": "exports"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "tsrecon"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// TRC codes selected when a session starts. All categories are selected when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_categories: Option<Vec<String>>,

    /// Format of exported reports
    #[serde(default = "default_export_format")]
    export_format: Format,

    /// Number of exported reports to keep
    #[serde(default = "default_export_copies")]
    export_copies: u32,

    /// Directory for exported reports, relative to config.json or absolute
    #[serde(default = "default_export_dir")]
    export_dir: PathBuf,
}

fn default_export_format() -> Format {
    Format::Csv
}

fn default_export_copies() -> u32 {
    EXPORT_COPIES
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(EXPORTS)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            default_categories: None,
            export_format: default_export_format(),
            export_copies: default_export_copies(),
            export_dir: default_export_dir(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
