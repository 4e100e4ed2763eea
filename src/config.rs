//! Configuration file loading.
//!
//! Search order (first existing file wins):
//!   1. ~/.config/gg-cli/config.yaml
//!   2. ~/.gg-cli.yaml
//!
//! ```yaml
//! core:
//!   system: rolemaster
//! characters:
//!   dir: /home/me/rpg/characters
//! ```
//!
//! A missing file yields defaults. An unreadable or malformed file is reported
//! as a warning and also yields defaults; configuration never stops startup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{log_debug, log_warn};

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub core: CoreConfig,
    pub characters: CharactersConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub system: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CharactersConfig {
    pub dir: Option<PathBuf>,
}

pub fn candidate_paths() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };
    vec![
        home.join(".config").join("gg-cli").join("config.yaml"),
        home.join(".gg-cli.yaml"),
    ]
}

/// Load from the standard locations.
pub fn load_config() -> Config {
    load_from(&candidate_paths())
}

pub fn load_from(candidates: &[PathBuf]) -> Config {
    for path in candidates.iter().filter(|p| p.is_file()) {
        match read_config(path) {
            Ok(config) => {
                log_debug!("loaded config from {}", path.display());
                return config;
            }
            Err(e) => {
                log_warn!("Failed to load config file at {}: {e:#}", path.display());
            }
        }
    }
    Config::default()
}

fn read_config(path: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&raw).context("failed to parse YAML config")
}

impl Config {
    /// Drop settings that name things which do not exist.
    pub fn validate(&mut self, valid_systems: &[&str]) {
        if let Some(system) = &self.core.system
            && !valid_systems.contains(&system.as_str())
        {
            log_warn!("Invalid system '{system}' in config file. Ignoring.");
            self.core.system = None;
        }
    }
}
