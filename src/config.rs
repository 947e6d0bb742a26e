// File: ./src/config.rs
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "ICSBOARD_CONFIG";
pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const DEFAULT_EVENT_LIMIT: usize = 5;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Local `.ics` file to read when none is given on the command line.
    pub source: Option<PathBuf>,
    /// How many days ahead of now to look.
    pub window_days: u32,
    /// Maximum number of events to display.
    pub event_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            window_days: DEFAULT_WINDOW_DAYS,
            event_limit: DEFAULT_EVENT_LIMIT,
        }
    }
}

impl Config {
    pub fn get_path() -> Option<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("com", "icsboard", "icsboard")
            .map(|proj| proj.config_dir().join("config.toml"))
    }

    /// Load from the default location. A missing file means defaults.
    pub fn load() -> Result<Self> {
        match Self::get_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config at {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
