use crate::core::aggregation::BalanceSnapshots;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Locations of the ledger CSV files. Relative paths are resolved against the
/// directory holding the config file.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LedgerConfig {
    pub transactions: String,
    pub investment_types: String,
    pub risk_tiers: String,
    #[serde(default)]
    pub delimiter: Option<char>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DisplayConfig {
    pub currency_symbol: String,
    pub decimal_separator: char,
    pub thousands_separator: char,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            currency_symbol: "$".to_string(),
            decimal_separator: '.',
            thousands_separator: ',',
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub balance_snapshots: BalanceSnapshots,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(skip)]
    config_dir: PathBuf,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "ledgerfolio", "ledgerfolio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.config_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Directory that relative ledger paths are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.config_dir
    }
}
