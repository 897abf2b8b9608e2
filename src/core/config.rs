use crate::core::aggregator::AggregatorConfig;
use crate::core::chit::{CHIT_DURATION_MONTHS, ChitPlan};
use crate::core::rate::{DEFAULT_USD_TO_INR, DefaultRateSet, Metal};
use crate::providers::ProviderKind;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Per-provider fetch timeout when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_api_key_param() -> String {
    "api_key".to_string()
}

fn default_usd_to_inr() -> f64 {
    DEFAULT_USD_TO_INR
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateProviderConfig {
    pub name: String,
    pub endpoint: String,
    pub kind: ProviderKind,
    /// Lower values are tried first.
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_param")]
    pub api_key_param: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DefaultRatesConfig {
    pub gold_per_gram: f64,
    pub silver_per_gram: f64,
    pub label: NaiveDate,
}

/// A product record as kept by the storefront. Every numeric field may be
/// left out; missing values price as zero.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProductConfig {
    pub name: String,
    #[serde(default = "default_metal")]
    pub metal: Metal,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub making_cost: Option<f64>,
    #[serde(default)]
    pub wastage_cost: Option<f64>,
    #[serde(default)]
    pub gst_percent: Option<f64>,
    /// Rate snapshot saved with the product; takes precedence over the market rate.
    #[serde(default)]
    pub rate_per_gram: Option<f64>,
    #[serde(default)]
    pub stored_total: Option<f64>,
}

fn default_metal() -> Metal {
    Metal::Gold
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: Vec<RateProviderConfig>,
    #[serde(default = "default_usd_to_inr")]
    pub usd_to_inr: f64,
    #[serde(default)]
    pub default_rates: Option<DefaultRatesConfig>,
    #[serde(default)]
    pub products: Vec<ProductConfig>,
    #[serde(default)]
    pub chit_plans: Vec<ChitPlan>,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "goldrate", "goldrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "goldrate", "goldrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.usd_to_inr.is_finite() || self.usd_to_inr <= 0.0 {
            anyhow::bail!("usd_to_inr must be positive, got {}", self.usd_to_inr);
        }
        self.default_rate_set()?;
        if let Some(plan) = self
            .chit_plans
            .iter()
            .find(|plan| plan.duration_months != CHIT_DURATION_MONTHS)
        {
            anyhow::bail!(
                "Chit plan {} has duration_months {}, only {} is supported",
                plan.plan_id,
                plan.duration_months,
                CHIT_DURATION_MONTHS
            );
        }
        Ok(())
    }

    /// The configured fallback rates, or the built-in set when none are configured.
    pub fn default_rate_set(&self) -> Result<DefaultRateSet> {
        match &self.default_rates {
            Some(rates) => {
                DefaultRateSet::new(rates.gold_per_gram, rates.silver_per_gram, rates.label)
                    .context("Invalid default_rates in config")
            }
            None => Ok(DefaultRateSet::default()),
        }
    }

    pub fn aggregator_config(&self) -> Result<AggregatorConfig> {
        Ok(AggregatorConfig {
            usd_to_inr: self.usd_to_inr,
            default_rates: self.default_rate_set()?,
        })
    }
}
