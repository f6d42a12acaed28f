//! Configuration management for the gmix CLI.

use anyhow::{Context, Result};
use gmix::prelude::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "gmix.toml";

/// gmix project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub fit: FitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    /// Name given to fitted models.
    #[serde(default = "default_name")]
    pub name: String,
    /// Show a progress bar while fitting.
    #[serde(default = "default_progress")]
    pub progress: bool,
}

fn default_name() -> String { "gmix".to_string() }
fn default_progress() -> bool { true }

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            progress: default_progress(),
        }
    }
}

impl Config {
    /// Load config from gmix.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Self::load_from(&cwd)
    }

    /// Load config from the nearest gmix.toml at or above `start`, falling
    /// back to defaults when there is none.
    pub fn load_from(start: &Path) -> Result<Self> {
        let config = if let Some(path) = find_config_file(start) {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            toml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?
        } else {
            Config::default()
        };
        config
            .model
            .validate()
            .context("Invalid [model] configuration")?;
        Ok(config)
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Generate default config as TOML string.
    pub fn default_toml() -> Result<String> {
        Config::default().to_toml()
    }
}

/// Find gmix.toml in `start` or its ancestors.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}
