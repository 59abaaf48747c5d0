//! Fee estimation for weft uploads.
//!
//! This crate provides:
//! - The `PriceOracle` seam to the network's fee endpoint
//! - Price estimators: per-chunk network caching, two-sample linear model,
//!   least-squares regression, and an ordered fallback chain
//! - Community tip sizing and recipient selection

pub mod error;
pub mod estimators;
pub mod traits;

pub use error::{PricingError, PricingResult};
pub use estimators::{
    chunk::{ChunkPriceEstimator, ChunkPricingInfo},
    fallback::FallbackPriceEstimator,
    network::NetworkPriceEstimator,
    regression::{RegressionModel, RegressionPriceEstimator},
};
pub use traits::{CommunityOracle, FixedCommunityOracle, PriceEstimator, PriceOracle, TipRate};

use std::sync::Arc;
use weft_core::ByteCount;
use weft_core::config::{EstimatorKind, PricingConfig};

/// Create a price estimator from configuration.
///
/// The configured strategies are always wrapped in a
/// [`FallbackPriceEstimator`], tried in the configured order. Setup is lazy:
/// no oracle call happens until the first estimate.
pub fn from_config(
    config: &PricingConfig,
    oracle: Arc<dyn PriceOracle>,
) -> PricingResult<Arc<dyn PriceEstimator>> {
    config.validate().map_err(PricingError::Config)?;

    let mut estimators: Vec<Arc<dyn PriceEstimator>> = Vec::with_capacity(config.strategies.len());
    for kind in &config.strategies {
        let estimator: Arc<dyn PriceEstimator> = match kind {
            EstimatorKind::Network => Arc::new(NetworkPriceEstimator::new(Arc::clone(&oracle))),
            EstimatorKind::Chunk => Arc::new(ChunkPriceEstimator::new(Arc::clone(&oracle))),
            EstimatorKind::Regression => match &config.regression_byte_volumes {
                Some(volumes) => Arc::new(RegressionPriceEstimator::with_byte_volumes(
                    Arc::clone(&oracle),
                    volumes.iter().copied().map(ByteCount::new).collect(),
                )?),
                None => Arc::new(RegressionPriceEstimator::new(Arc::clone(&oracle))),
            },
        };
        estimators.push(estimator);
    }

    tracing::debug!(strategies = ?config.strategies, "configured price estimators");
    Ok(Arc::new(FallbackPriceEstimator::new(estimators)?))
}
