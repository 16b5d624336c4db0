//! Recorder configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a [`Recorder`](crate::Recorder)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Root directory holding the daily log directories
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Production mode: errors and warnings are written to file only (no
    /// console echo) and error entries are never escalated back to callers
    #[serde(default)]
    pub production: bool,

    /// Maximum size of a severity file before it is rotated aside (default: 10 MiB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Days a daily directory is kept before the sweep deletes it (default: 7)
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,

    /// Seconds between retention sweeps (default: 24 hours)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_root() -> PathBuf {
    try_home_root().unwrap_or_else(|| PathBuf::from("logbook-logs"))
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_retention_days() -> u64 {
    crate::retention::DEFAULT_RETENTION_DAYS
}

fn default_sweep_interval_secs() -> u64 {
    24 * 60 * 60
}

/// Default log root under the user's home directory, if one is available
fn try_home_root() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".logbook").join("logs"))
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            production: false,
            max_file_size: default_max_file_size(),
            retention_days: default_retention_days(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl RecorderConfig {
    /// Load configuration from a TOML file, or return defaults if it does
    /// not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content =
                std::fs::read_to_string(path).context("Failed to read recorder config file")?;
            toml::from_str(&content).context("Failed to parse recorder config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize recorder config")?;
        std::fs::write(path, content).context("Failed to write recorder config file")?;
        Ok(())
    }

    /// Config rooted at a specific directory, other fields default
    pub fn at_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}
