//! Configuration file support for cyclecalc.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/cyclecalc/config.toml`.

use crate::fertility::FertilityOptions;
use crate::types::DEFAULT_CYCLE_LENGTH;
use crate::validation::CYCLE_LENGTH_RANGE;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub cycle: CycleConfig,

    #[serde(default)]
    pub fertility: FertilityConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Cycle defaults applied when the caller leaves a value out
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CycleConfig {
    #[serde(default = "default_cycle_length")]
    pub default_cycle_length: u32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            default_cycle_length: default_cycle_length(),
        }
    }
}

/// Fertile window enrichment switches
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FertilityConfig {
    #[serde(default = "default_true")]
    pub include_variability: bool,
}

impl Default for FertilityConfig {
    fn default() -> Self {
        Self {
            include_variability: true,
        }
    }
}

impl From<&FertilityConfig> for FertilityOptions {
    fn from(config: &FertilityConfig) -> Self {
        FertilityOptions {
            include_variability: config.include_variability,
        }
    }
}

/// Calculation history configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_true")]
    pub record: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { record: true }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("cyclecalc")
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("cyclecalc").join("config.toml")
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if !CYCLE_LENGTH_RANGE.contains(&self.cycle.default_cycle_length) {
            return Err(Error::Config(format!(
                "cycle.default_cycle_length must be between {} and {}, got {}",
                CYCLE_LENGTH_RANGE.start(),
                CYCLE_LENGTH_RANGE.end(),
                self.cycle.default_cycle_length
            )));
        }
        Ok(())
    }

    /// Fertile window options derived from this configuration
    pub fn fertility_options(&self) -> FertilityOptions {
        FertilityOptions::from(&self.fertility)
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
