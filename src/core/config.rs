use crate::core::analysis::DEFAULT_UNDER_BUDGET_RATIO;
use crate::core::currency::CurrencyInfo;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

/// One exchange rate seeded into the rate table.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RateConfig {
    pub from: String,
    pub to: String,
    pub rate: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
    #[serde(default = "default_rate_ttl_secs")]
    pub rate_ttl_secs: u64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: None,
            rate_ttl_secs: default_rate_ttl_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Disk,
    Memory,
}

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_cache_ttl_ms() -> u64 {
    500
}

fn default_rate_ttl_secs() -> u64 {
    3600
}

fn default_under_budget_ratio() -> f64 {
    DEFAULT_UNDER_BUDGET_RATIO
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Display currency used when a vacation does not name one.
    pub currency: String,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    #[serde(default = "default_under_budget_ratio")]
    pub under_budget_ratio: f64,
    #[serde(default)]
    pub store: StoreKind,
    pub data_path: Option<String>,
    #[serde(default)]
    pub rates: Vec<RateConfig>,
    #[serde(default)]
    pub custom_currencies: Vec<CurrencyInfo>,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "tripwise", "tripwise")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("app", "tripwise", "tripwise")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn rate_ttl(&self) -> Duration {
        Duration::from_secs(self.providers.rate_ttl_secs)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
