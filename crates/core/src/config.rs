//! Configuration types shared across crates.

use crate::byte_count::ByteCount;
use crate::chunk::chunk_count;
use crate::fee_multiple::FeeMultiple;
use crate::tags::TagSettings;
use crate::winston::Winston;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment variables overriding configuration.
pub const ENV_PREFIX: &str = "WEFT_";

/// Bundling configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BundlingConfig {
    /// Pack data items into bundles (default: true).
    #[serde(default = "default_bundling_enabled")]
    pub enabled: bool,
    /// Maximum summed data item bytes per bundle.
    #[serde(default = "default_max_bundle_size")]
    pub max_bundle_size: u64,
    /// Maximum data items per bundle. Must be at least 2.
    #[serde(default = "default_max_data_item_limit")]
    pub max_data_item_limit: u64,
}

fn default_bundling_enabled() -> bool {
    true
}

fn default_max_bundle_size() -> u64 {
    crate::DEFAULT_MAX_BUNDLE_SIZE
}

fn default_max_data_item_limit() -> u64 {
    crate::DEFAULT_MAX_DATA_ITEM_LIMIT
}

impl Default for BundlingConfig {
    fn default() -> Self {
        Self {
            enabled: default_bundling_enabled(),
            max_bundle_size: default_max_bundle_size(),
            max_data_item_limit: default_max_data_item_limit(),
        }
    }
}

impl BundlingConfig {
    /// Validate bundling limits.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_data_item_limit < 2 {
            return Err(format!(
                "bundling.max_data_item_limit must be at least 2, got {}",
                self.max_data_item_limit
            ));
        }
        if self.max_bundle_size == 0 {
            return Err("bundling.max_bundle_size cannot be 0".to_string());
        }
        Ok(())
    }
}

/// Fee boosting configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Multiplier applied to network fees at submission (default: 1.0).
    #[serde(default)]
    pub fee_multiple: FeeMultiple,
}

/// Community tip configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TipConfig {
    /// Share of the data fee paid as a tip (default: 0.15).
    #[serde(default = "default_tip_percentage")]
    pub percentage: f64,
    /// Smallest tip ever paid, in winston (default: 10000000).
    #[serde(default = "default_minimum_tip")]
    pub minimum_winston: Winston,
    /// Address receiving tips. Without one, uploads carry no tip.
    #[serde(default)]
    pub recipient: Option<String>,
}

fn default_tip_percentage() -> f64 {
    0.15
}

fn default_minimum_tip() -> Winston {
    Winston::from(10_000_000)
}

impl Default for TipConfig {
    fn default() -> Self {
        Self {
            percentage: default_tip_percentage(),
            minimum_winston: default_minimum_tip(),
            recipient: None,
        }
    }
}

impl TipConfig {
    /// Validate tip settings.
    pub fn validate(&self) -> Result<(), String> {
        if !self.percentage.is_finite() || self.percentage < 0.0 {
            return Err(format!(
                "tip.percentage must be a finite non-negative number, got {}",
                self.percentage
            ));
        }
        if let Some(recipient) = &self.recipient {
            crate::entity::ArweaveAddress::parse(recipient)
                .map_err(|e| format!("tip.recipient: {e}"))?;
        }
        Ok(())
    }
}

/// Price estimation strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    /// Ask the oracle per chunk count, caching answers.
    Network,
    /// Two oracle samples and a linear per-chunk model.
    Chunk,
    /// Least-squares fit over several oracle samples.
    Regression,
}

/// Fewest byte volumes the regression strategy samples.
pub const MIN_REGRESSION_VOLUMES: usize = 3;

/// Price estimation configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Strategies tried in order; a failing strategy is dropped for good.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<EstimatorKind>,
    /// Byte volumes sampled by the regression strategy.
    #[serde(default)]
    pub regression_byte_volumes: Option<Vec<u64>>,
}

fn default_strategies() -> Vec<EstimatorKind> {
    vec![EstimatorKind::Chunk, EstimatorKind::Network]
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            regression_byte_volumes: None,
        }
    }
}

impl PricingConfig {
    /// Validate the strategy chain.
    pub fn validate(&self) -> Result<(), String> {
        if self.strategies.is_empty() {
            return Err("pricing.strategies must name at least one strategy".to_string());
        }
        if let Some(volumes) = &self.regression_byte_volumes {
            if !self.strategies.contains(&EstimatorKind::Regression) {
                return Err(
                    "pricing.regression_byte_volumes is set but no regression strategy is configured"
                        .to_string(),
                );
            }
            if volumes.len() < MIN_REGRESSION_VOLUMES {
                return Err(format!(
                    "pricing.regression_byte_volumes needs at least {MIN_REGRESSION_VOLUMES} volumes, got {}",
                    volumes.len()
                ));
            }
            let mut chunks: Vec<u64> = volumes
                .iter()
                .map(|volume| chunk_count(ByteCount::new(*volume)))
                .collect();
            chunks.sort_unstable();
            chunks.dedup();
            if chunks.len() < 2 {
                return Err(
                    "pricing.regression_byte_volumes must span at least 2 distinct chunk counts"
                        .to_string(),
                );
            }
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bundling: BundlingConfig,
    #[serde(default)]
    pub fees: FeeConfig,
    #[serde(default)]
    pub tip: TipConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub tags: TagSettings,
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then `WEFT_`-prefixed
    /// environment variables (nested keys split on `__`), and validate it.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        let config: AppConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate().map_err(crate::Error::Config)?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.bundling.validate()?;
        self.tip.validate()?;
        self.pricing.validate()?;
        self.tags.validate()?;
        Ok(())
    }
}
