//! Configuration Loader
//!
//! Handles loading and merging settings from built-in defaults and files.

use crate::config::settings::Settings;
use crate::error::{Result, TaleforgeError};
use serde_json::map::Entry;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable pointing at an explicit settings file
pub const CONFIG_PATH_ENV: &str = "TALEFORGE_CONFIG_PATH";

/// Configuration loader with support for multiple sources
pub struct ConfigLoader {
    config: Settings,
}

impl ConfigLoader {
    /// Create a new config loader and load from default locations
    pub fn new() -> Result<Self> {
        let mut loader = Self {
            config: Settings::default(),
        };

        loader.load_from_default_paths()?;

        Ok(loader)
    }

    /// Create a loader with a specific config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut loader = Self {
            config: Settings::default(),
        };

        loader.load_from_file(path)?;

        Ok(loader)
    }

    /// Load configuration from default paths
    fn load_from_default_paths(&mut self) -> Result<()> {
        for path in Self::get_config_paths() {
            if path.exists() {
                self.load_from_file(&path)?;
            }
        }

        Ok(())
    }

    /// Get list of config paths to check, lowest priority first
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Home directory
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".taleforge").join("taleforge.json"));
        }

        // 2. User config directory
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("taleforge").join("taleforge.json"));
        }

        // 3. Current directory
        paths.push(PathBuf::from("taleforge.json"));

        // 4. Environment variable
        if let Ok(custom_path) = std::env::var(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(custom_path));
        }

        paths
    }

    /// Load configuration from a specific file
    ///
    /// Keys present in the file override what is already loaded; absent keys
    /// keep their current values.
    fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TaleforgeError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let overrides: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            TaleforgeError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        let mut merged = serde_json::to_value(&self.config).map_err(|e| {
            TaleforgeError::Configuration(format!("Failed to serialize settings: {}", e))
        })?;
        merge_json(&mut merged, overrides);

        self.config = serde_json::from_value(merged).map_err(|e| {
            TaleforgeError::Configuration(format!("Invalid settings in {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "Loaded settings file");
        Ok(())
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &Settings {
        &self.config
    }

    /// Take ownership of the configuration
    pub fn into_config(self) -> Settings {
        self.config
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            config: Settings::default(),
        })
    }
}

/// Recursively overlay `overrides` onto `base`; objects merge, everything else replaces
fn merge_json(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.entry(key) {
                    Entry::Occupied(mut existing) => merge_json(existing.get_mut(), value),
                    Entry::Vacant(slot) => {
                        slot.insert(value);
                    }
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}
