//! Configuration file support for waymark
//!
//! Reads from .waymark/config.toml

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use crate::trail::DEFAULT_MAX_CHAIN;

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Config {
    /// Traversal settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Terminal picker settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// Traversal-related configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EngineConfig {
    /// Longest chain of auto-skipped junctions before a walk is rejected
    /// Default: 64, minimum 1
    #[serde(default = "default_max_chain", deserialize_with = "at_least_one")]
    pub max_chain: usize,
}

/// Picker display configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UiConfig {
    /// Show "Title: Label" under the selected decision
    /// Default: true
    #[serde(default = "default_true")]
    pub show_titles: bool,

    /// Accent color for the active choice (any ratatui color name)
    /// Default: "cyan"
    #[serde(default = "default_accent")]
    pub accent: String,
}

fn default_max_chain() -> usize {
    DEFAULT_MAX_CHAIN
}

fn at_least_one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let value = usize::deserialize(deserializer)?;
    if value == 0 {
        tracing::warn!("engine.max_chain = 0 would reject every skip, using 1");
    }
    Ok(value.max(1))
}

fn default_true() -> bool {
    true
}

fn default_accent() -> String {
    "cyan".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chain: default_max_chain(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_titles: true,
            accent: default_accent(),
        }
    }
}

impl Config {
    /// Load config from .waymark/config.toml
    /// Returns default config if file doesn't exist
    pub fn load() -> Self {
        if let Some(path) = Self::find_config_path() {
            if let Ok(contents) = std::fs::read_to_string(&path) {
                match toml::from_str(&contents) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("ignoring {}: {}", path.display(), e),
                }
            }
        }
        Self::default()
    }

    /// Find config.toml by walking up directory tree
    fn find_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut dir = current_dir.as_path();

        loop {
            let config_path = dir.join(".waymark").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
        None
    }
}
