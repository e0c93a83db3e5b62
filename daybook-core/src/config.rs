//! Global daybook configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{DaybookError, DaybookResult};

static DEFAULT_REFRESH_INTERVAL: &str = "15m";
static DEFAULT_FETCH_TIMEOUT: &str = "15s";

fn default_refresh_interval() -> String {
    DEFAULT_REFRESH_INTERVAL.to_string()
}

fn default_fetch_timeout() -> String {
    DEFAULT_FETCH_TIMEOUT.to_string()
}

/// Configuration at ~/.config/daybook/config.toml, overridable with
/// `DAYBOOK_*` environment variables (e.g. `DAYBOOK_DATA_DIR`).
#[derive(Deserialize, Clone, Debug)]
pub struct DaybookConfig {
    /// Where events, routines and feed sources are stored.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: String,
}

impl Default for DaybookConfig {
    fn default() -> Self {
        DaybookConfig {
            data_dir: None,
            refresh_interval: default_refresh_interval(),
            fetch_timeout: default_fetch_timeout(),
        }
    }
}

impl DaybookConfig {
    pub fn config_path() -> DaybookResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DaybookError::Config("Could not determine config directory".into()))?
            .join("daybook");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template first
    /// if no config file exists yet.
    pub fn load() -> DaybookResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> DaybookResult<Self> {
        let config: DaybookConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("DAYBOOK"))
            .build()
            .map_err(|e| DaybookError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| DaybookError::Config(e.to_string()))?;

        // Surface bad durations at load time rather than on first refresh
        config.refresh_interval()?;
        config.fetch_timeout()?;

        Ok(config)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> DaybookResult<()> {
        let contents = format!(
            "\
# daybook configuration

# Where events, routines and feed sources are stored:
# data_dir = \"~/.local/share/daybook\"

# How often feeds are refreshed while watching:
# refresh_interval = \"{DEFAULT_REFRESH_INTERVAL}\"

# Per-feed download timeout:
# fetch_timeout = \"{DEFAULT_FETCH_TIMEOUT}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DaybookError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| DaybookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// The data directory with `~` expanded. Falls back to the platform data
    /// directory when unset.
    pub fn data_path(&self) -> DaybookResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(PathBuf::from(
                shellexpand::tilde(&dir.to_string_lossy()).into_owned(),
            )),
            None => dirs::data_dir()
                .map(|d| d.join("daybook"))
                .ok_or_else(|| DaybookError::Config("Could not determine data directory".into())),
        }
    }

    pub fn refresh_interval(&self) -> DaybookResult<Duration> {
        let interval = parse_duration("refresh_interval", &self.refresh_interval)?;
        if interval.is_zero() {
            return Err(DaybookError::Config(
                "refresh_interval must be greater than zero".into(),
            ));
        }
        Ok(interval)
    }

    pub fn fetch_timeout(&self) -> DaybookResult<Duration> {
        parse_duration("fetch_timeout", &self.fetch_timeout)
    }
}

fn parse_duration(key: &str, value: &str) -> DaybookResult<Duration> {
    humantime::parse_duration(value.trim())
        .map_err(|e| DaybookError::Config(format!("Invalid {key} '{value}': {e}")))
}
