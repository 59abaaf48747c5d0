//! Estimator built from two oracle samples and a per-chunk linear model.

use super::{MemoizedSetup, linear_byte_capacity};
use crate::error::PricingResult;
use crate::traits::{PriceEstimator, PriceOracle};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use weft_core::chunk::chunk_count;
use weft_core::{ByteCount, Winston};

/// Added to the sampled base fee when pricing data is refreshed.
pub const BASE_FEE_CALIBRATION: u64 = 2;

/// Added to the sampled marginal fee of every chunk.
pub const PER_CHUNK_ROUNDING: u64 = 1;

/// Linear pricing model derived from the oracle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkPricingInfo {
    /// Fee for zero bytes.
    pub base_fee: Winston,
    /// Marginal fee of each chunk as sampled from the oracle.
    pub per_chunk_fee: Winston,
}

impl ChunkPricingInfo {
    pub fn new(base_fee: Winston, per_chunk_fee: Winston) -> Self {
        Self {
            base_fee,
            per_chunk_fee,
        }
    }

    /// Fee charged per chunk, including the rounding allowance.
    pub fn chunk_fee(&self) -> Winston {
        &self.per_chunk_fee + &Winston::from(PER_CHUNK_ROUNDING)
    }

    /// Fee for exactly one chunk.
    pub fn one_chunk_fee(&self) -> Winston {
        &self.base_fee + &self.chunk_fee()
    }

    /// `base + chunk_fee × ceil(bytes / chunk size)`.
    pub fn fee_for(&self, byte_count: ByteCount) -> Winston {
        &self.base_fee + &self.chunk_fee().times(chunk_count(byte_count))
    }

    /// Smallest byte count spanning the most chunks `fee` affords.
    pub fn byte_capacity(&self, fee: &Winston) -> ByteCount {
        linear_byte_capacity(
            fee,
            &self.base_fee,
            &self.one_chunk_fee(),
            &self.chunk_fee(),
        )
    }
}

/// Prices byte counts with pure arithmetic after a two-sample setup.
///
/// Setup asks the oracle for the fee of 0 bytes and of 1 byte. After that
/// no estimate touches the network until [`refresh_price_data`] is called
/// again.
///
/// [`refresh_price_data`]: ChunkPriceEstimator::refresh_price_data
pub struct ChunkPriceEstimator {
    oracle: Arc<dyn PriceOracle>,
    setup: MemoizedSetup<ChunkPricingInfo>,
}

impl ChunkPriceEstimator {
    /// Create an estimator that samples the oracle on first use.
    pub fn new(oracle: Arc<dyn PriceOracle>) -> Self {
        Self {
            oracle,
            setup: MemoizedSetup::new(),
        }
    }

    /// Create an estimator and sample the oracle immediately.
    pub async fn with_setup(oracle: Arc<dyn PriceOracle>) -> PricingResult<Self> {
        let estimator = Self::new(oracle);
        estimator.refresh_price_data().await?;
        Ok(estimator)
    }

    /// Current pricing data, if setup has completed.
    pub fn pricing_info(&self) -> Option<ChunkPricingInfo> {
        self.setup.current()
    }

    /// Re-sample the oracle. Concurrent callers share one refresh.
    pub async fn refresh_price_data(&self) -> PricingResult<ChunkPricingInfo> {
        let oracle = Arc::clone(&self.oracle);
        self.setup.refresh(move || sample(oracle)).await
    }

    async fn ensure_pricing_info(&self) -> PricingResult<ChunkPricingInfo> {
        let oracle = Arc::clone(&self.oracle);
        self.setup.get_or_refresh(move || sample(oracle)).await
    }
}

fn sample(oracle: Arc<dyn PriceOracle>) -> BoxFuture<'static, PricingResult<ChunkPricingInfo>> {
    async move {
        let (zero_bytes_fee, one_byte_fee) = futures::try_join!(
            oracle.fee_for_byte_count(ByteCount::ZERO),
            oracle.fee_for_byte_count(ByteCount::new(1)),
        )?;
        let per_chunk_fee = one_byte_fee.minus(&zero_bytes_fee)?;
        let base_fee = zero_bytes_fee + Winston::from(BASE_FEE_CALIBRATION);
        tracing::debug!(
            base_fee = %base_fee,
            per_chunk_fee = %per_chunk_fee,
            "refreshed chunk pricing data"
        );
        Ok(ChunkPricingInfo::new(base_fee, per_chunk_fee))
    }
    .boxed()
}

#[async_trait]
impl PriceEstimator for ChunkPriceEstimator {
    async fn base_fee(&self, byte_count: ByteCount) -> PricingResult<Winston> {
        let pricing_info = self.ensure_pricing_info().await?;
        Ok(pricing_info.fee_for(byte_count))
    }

    async fn byte_capacity(&self, fee: &Winston) -> PricingResult<ByteCount> {
        let pricing_info = self.ensure_pricing_info().await?;
        Ok(pricing_info.byte_capacity(fee))
    }

    fn estimator_name(&self) -> &'static str {
        "chunk"
    }
}
