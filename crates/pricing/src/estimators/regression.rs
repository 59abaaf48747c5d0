//! Estimator fitted by least squares over several oracle samples.

use super::MemoizedSetup;
use crate::error::{PricingError, PricingResult};
use crate::traits::{PriceEstimator, PriceOracle};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, try_join_all};
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};
use std::sync::Arc;
use weft_core::chunk::{chunk_count, min_bytes_for_chunks};
use weft_core::config::MIN_REGRESSION_VOLUMES;
use weft_core::{ByteCount, Winston};

/// Byte volumes sampled when none are configured: 100 KiB, 100 MiB, 10 GiB.
pub const DEFAULT_BYTE_VOLUMES: [u64; 3] = [
    100 * 1024,
    100 * 1024 * 1024,
    10 * 1024 * 1024 * 1024,
];

/// A fitted fee line `fee(chunks) = ceil((intercept + slope × chunks) / denominator)`.
///
/// Both coefficients are clamped to be non-negative, so the fee never
/// decreases as the chunk count grows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegressionModel {
    intercept: BigUint,
    slope: BigUint,
    denominator: BigUint,
}

impl RegressionModel {
    /// Fit a model to `(chunk count, fee)` samples.
    ///
    /// Requires at least two distinct chunk counts.
    pub fn fit(samples: &[(u64, Winston)]) -> PricingResult<Self> {
        let mut distinct: Vec<u64> = samples.iter().map(|(chunks, _)| *chunks).collect();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < 2 {
            return Err(PricingError::InvalidSampleVolumes(format!(
                "need at least 2 distinct chunk counts, got {}",
                distinct.len()
            )));
        }

        let n = BigInt::from(samples.len());
        let mut sum_x = BigInt::zero();
        let mut sum_y = BigInt::zero();
        let mut sum_xx = BigInt::zero();
        let mut sum_xy = BigInt::zero();
        for (chunks, fee) in samples {
            let x = BigInt::from(*chunks);
            let y = BigInt::from_biguint(Sign::Plus, fee.as_biguint().clone());
            sum_xx += &x * &x;
            sum_xy += &x * &y;
            sum_x += x;
            sum_y += y;
        }

        // D > 0 whenever two x values differ.
        let spread = &n * &sum_xx - &sum_x * &sum_x;
        let covariance = clamp(&n * &sum_xy - &sum_x * &sum_y);
        let intercept = clamp(&sum_y * &spread - &covariance * &sum_x);
        let slope = &n * &covariance;
        let denominator = &n * &spread;

        Ok(Self {
            intercept: to_biguint(intercept),
            slope: to_biguint(slope),
            denominator: to_biguint(denominator),
        })
    }

    /// Fee for `chunks` chunks, rounded up.
    pub fn fee_for_chunks(&self, chunks: u64) -> Winston {
        let numerator = &self.intercept + &self.slope * BigUint::from(chunks);
        Winston::new(Integer::div_ceil(&numerator, &self.denominator))
    }

    /// Fitted fee for zero bytes.
    pub fn base_fee(&self) -> Winston {
        self.fee_for_chunks(0)
    }

    /// Fee for `byte_count` bytes.
    pub fn fee_for(&self, byte_count: ByteCount) -> Winston {
        self.fee_for_chunks(chunk_count(byte_count))
    }

    /// Conservative capacity of `fee`.
    ///
    /// Finds the highest fee level `fee` affords and returns the smallest
    /// byte count charged at that level, so inverting the fee of any byte
    /// count never yields more bytes than it. A flat model gives zero.
    pub fn byte_capacity(&self, fee: &Winston) -> ByteCount {
        let scaled = fee.as_biguint() * &self.denominator;
        if scaled < self.intercept || self.slope.is_zero() {
            return ByteCount::ZERO;
        }
        let affordable = ((scaled - &self.intercept) / &self.slope)
            .to_u64()
            .unwrap_or(u64::MAX);
        let level = self.fee_for_chunks(affordable);
        if level.is_zero() {
            return ByteCount::ZERO;
        }

        // Smallest chunk count with intercept + slope × chunks > (level - 1) × denominator.
        let below_level = (level.as_biguint() - 1u32) * &self.denominator;
        let chunks = if below_level < self.intercept {
            0
        } else {
            ((below_level - &self.intercept) / &self.slope + 1u32)
                .to_u64()
                .unwrap_or(u64::MAX)
        };
        min_bytes_for_chunks(chunks.min(affordable))
    }
}

fn clamp(value: BigInt) -> BigInt {
    if value.sign() == Sign::Minus {
        BigInt::zero()
    } else {
        value
    }
}

fn to_biguint(value: BigInt) -> BigUint {
    value.to_biguint().unwrap_or_default()
}

/// Prices byte counts from a linear fit over several oracle samples.
///
/// Setup queries the oracle once per configured byte volume. Concurrent
/// callers share the same setup.
pub struct RegressionPriceEstimator {
    oracle: Arc<dyn PriceOracle>,
    byte_volumes: Vec<ByteCount>,
    setup: MemoizedSetup<RegressionModel>,
}

impl RegressionPriceEstimator {
    /// Create an estimator sampling [`DEFAULT_BYTE_VOLUMES`].
    pub fn new(oracle: Arc<dyn PriceOracle>) -> Self {
        Self {
            oracle,
            byte_volumes: DEFAULT_BYTE_VOLUMES.into_iter().map(ByteCount::new).collect(),
            setup: MemoizedSetup::new(),
        }
    }

    /// Create an estimator sampling the given byte volumes.
    ///
    /// At least [`MIN_REGRESSION_VOLUMES`] volumes are required, covering at
    /// least two distinct chunk counts.
    pub fn with_byte_volumes(
        oracle: Arc<dyn PriceOracle>,
        byte_volumes: Vec<ByteCount>,
    ) -> PricingResult<Self> {
        if byte_volumes.len() < MIN_REGRESSION_VOLUMES {
            return Err(PricingError::InvalidSampleVolumes(format!(
                "need at least {MIN_REGRESSION_VOLUMES} byte volumes, got {}",
                byte_volumes.len()
            )));
        }
        let mut chunks: Vec<u64> = byte_volumes.iter().map(|v| chunk_count(*v)).collect();
        chunks.sort_unstable();
        chunks.dedup();
        if chunks.len() < 2 {
            return Err(PricingError::InvalidSampleVolumes(format!(
                "byte volumes {byte_volumes:?} cover fewer than 2 distinct chunk counts"
            )));
        }
        Ok(Self {
            oracle,
            byte_volumes,
            setup: MemoizedSetup::new(),
        })
    }

    pub fn byte_volumes(&self) -> &[ByteCount] {
        &self.byte_volumes
    }

    /// The fitted model, if setup has completed.
    pub fn model(&self) -> Option<RegressionModel> {
        self.setup.current()
    }

    /// Re-sample the oracle and refit. Concurrent callers share one refresh.
    pub async fn refresh_price_data(&self) -> PricingResult<RegressionModel> {
        let (oracle, volumes) = (Arc::clone(&self.oracle), self.byte_volumes.clone());
        self.setup.refresh(move || fit(oracle, volumes)).await
    }

    async fn ensure_model(&self) -> PricingResult<RegressionModel> {
        let (oracle, volumes) = (Arc::clone(&self.oracle), self.byte_volumes.clone());
        self.setup.get_or_refresh(move || fit(oracle, volumes)).await
    }
}

fn fit(
    oracle: Arc<dyn PriceOracle>,
    byte_volumes: Vec<ByteCount>,
) -> BoxFuture<'static, PricingResult<RegressionModel>> {
    async move {
        let fees = try_join_all(
            byte_volumes
                .iter()
                .map(|volume| oracle.fee_for_byte_count(*volume)),
        )
        .await?;
        let samples: Vec<(u64, Winston)> = byte_volumes
            .iter()
            .map(|volume| chunk_count(*volume))
            .zip(fees)
            .collect();
        let model = RegressionModel::fit(&samples)?;
        tracing::debug!(
            samples = samples.len(),
            base_fee = %model.base_fee(),
            "fitted regression pricing model"
        );
        Ok(model)
    }
    .boxed()
}

#[async_trait]
impl PriceEstimator for RegressionPriceEstimator {
    async fn base_fee(&self, byte_count: ByteCount) -> PricingResult<Winston> {
        Ok(self.ensure_model().await?.fee_for(byte_count))
    }

    async fn byte_capacity(&self, fee: &Winston) -> PricingResult<ByteCount> {
        Ok(self.ensure_model().await?.byte_capacity(fee))
    }

    fn estimator_name(&self) -> &'static str {
        "regression"
    }
}
