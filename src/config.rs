use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::app_dirs::AppDirs;

pub const DEFAULT_TICK_MS: u64 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub duration_secs: u64,
    pub offered_durations: Vec<u64>,
    pub tick_ms: u64,
    pub last_source: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration_secs: 60,
            offered_durations: vec![30, 60, 120, 300],
            tick_ms: DEFAULT_TICK_MS,
            last_source: None,
        }
    }
}

impl Config {
    /// Duration that follows `current` in the offered list, wrapping around.
    /// A current value outside the list starts over at the first offer.
    pub fn next_duration(&self, current: u64) -> u64 {
        let offers: Vec<u64> = self
            .offered_durations
            .iter()
            .copied()
            .filter(|d| *d > 0)
            .collect();
        if offers.is_empty() {
            return current.max(1);
        }
        match offers.iter().position(|d| *d == current) {
            Some(i) => offers[(i + 1) % offers.len()],
            None => offers[0],
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => cfg,
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), error = %err, "ignoring unreadable config");
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
