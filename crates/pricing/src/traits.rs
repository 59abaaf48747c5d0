//! Pricing trait definitions.

use crate::error::{PricingError, PricingResult};
use async_trait::async_trait;
use weft_core::config::TipConfig;
use weft_core::{ArweaveAddress, ByteCount, ExactDecimal, Winston};

/// Source of raw network fees.
#[async_trait]
pub trait PriceOracle: Send + Sync + 'static {
    /// Fee the network currently charges to store `byte_count` bytes.
    async fn fee_for_byte_count(&self, byte_count: ByteCount) -> PricingResult<Winston>;
}

/// Rule for sizing a community tip against a base fee.
#[derive(Clone, Debug, PartialEq)]
pub struct TipRate {
    percentage: ExactDecimal,
    minimum: Winston,
}

impl TipRate {
    pub fn new(percentage: f64, minimum: Winston) -> PricingResult<Self> {
        let percentage = ExactDecimal::from_f64(percentage)?;
        Ok(Self {
            percentage,
            minimum,
        })
    }

    pub fn from_config(config: &TipConfig) -> PricingResult<Self> {
        Self::new(config.percentage, config.minimum_winston.clone())
    }

    pub fn minimum(&self) -> &Winston {
        &self.minimum
    }

    /// `max(minimum, floor(base_fee × percentage))`.
    pub fn tip_for(&self, base_fee: &Winston) -> Winston {
        base_fee
            .times_floor(&self.percentage)
            .max(self.minimum.clone())
    }

    /// The largest base fee whose fee plus tip fits within `budget`, or
    /// `None` when even the minimum tip does not fit.
    pub fn base_fee_within(&self, budget: &Winston) -> Option<Winston> {
        // floor(budget / (1 + percentage))
        let numerator = self.percentage.numerator();
        let denominator = self.percentage.denominator();
        let base =
            (budget.as_biguint() * denominator) / (denominator + numerator);
        let base = Winston::new(base);
        let tip = budget.minus(&base).ok()?.max(self.minimum.clone());
        budget.minus(&tip).ok()
    }
}

/// Turns byte counts into fees and back.
#[async_trait]
pub trait PriceEstimator: Send + Sync {
    /// Network fee for storing `byte_count` bytes, without any tip.
    async fn base_fee(&self, byte_count: ByteCount) -> PricingResult<Winston>;

    /// Bytes that `fee` is guaranteed to pay for.
    async fn byte_capacity(&self, fee: &Winston) -> PricingResult<ByteCount>;

    /// Name of the strategy, used in logs.
    fn estimator_name(&self) -> &'static str;

    /// Network fee plus community tip for storing `byte_count` bytes.
    async fn fee_with_tip(
        &self,
        byte_count: ByteCount,
        tip_rate: &TipRate,
    ) -> PricingResult<Winston> {
        let base_fee = self.base_fee(byte_count).await?;
        let tip = tip_rate.tip_for(&base_fee);
        Ok(base_fee + tip)
    }

    /// Bytes that `budget` pays for once the community tip is set aside.
    async fn byte_capacity_with_tip(
        &self,
        budget: &Winston,
        tip_rate: &TipRate,
    ) -> PricingResult<ByteCount> {
        match tip_rate.base_fee_within(budget) {
            Some(base_fee) => self.byte_capacity(&base_fee).await,
            None => Ok(ByteCount::ZERO),
        }
    }
}

/// Sizes community tips and picks who receives them.
#[async_trait]
pub trait CommunityOracle: Send + Sync {
    /// Tip owed on top of `base_fee`.
    async fn tip_for(&self, base_fee: &Winston) -> PricingResult<Winston>;

    /// Address that receives the next tip.
    async fn select_tip_recipient(&self) -> PricingResult<ArweaveAddress>;
}

/// A community oracle with a fixed tip rate and recipient.
#[derive(Clone, Debug)]
pub struct FixedCommunityOracle {
    rate: TipRate,
    recipient: Option<ArweaveAddress>,
}

impl FixedCommunityOracle {
    pub fn new(rate: TipRate, recipient: Option<ArweaveAddress>) -> Self {
        Self { rate, recipient }
    }

    pub fn from_config(config: &TipConfig) -> PricingResult<Self> {
        let recipient = config
            .recipient
            .as_deref()
            .map(ArweaveAddress::parse)
            .transpose()?;
        Ok(Self::new(TipRate::from_config(config)?, recipient))
    }
}

#[async_trait]
impl CommunityOracle for FixedCommunityOracle {
    async fn tip_for(&self, base_fee: &Winston) -> PricingResult<Winston> {
        Ok(self.rate.tip_for(base_fee))
    }

    async fn select_tip_recipient(&self) -> PricingResult<ArweaveAddress> {
        self.recipient
            .clone()
            .ok_or_else(|| PricingError::CommunityTip("no tip recipient configured".to_string()))
    }
}
