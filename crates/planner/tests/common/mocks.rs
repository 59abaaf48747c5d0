use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use weft_core::{ArweaveAddress, ByteCount, Winston};
use weft_pricing::{CommunityOracle, PriceEstimator, PriceOracle, PricingError, PricingResult};

/// Estimator charging one winston per byte.
#[allow(dead_code)]
pub struct IdentityEstimator;

#[allow(dead_code)]
impl IdentityEstimator {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self)
    }
}

#[async_trait]
impl PriceEstimator for IdentityEstimator {
    async fn base_fee(&self, byte_count: ByteCount) -> PricingResult<Winston> {
        Ok(Winston::from(byte_count.get()))
    }

    async fn byte_capacity(&self, fee: &Winston) -> PricingResult<ByteCount> {
        Ok(ByteCount::new(u64::try_from(fee.as_biguint()).unwrap_or(u64::MAX)))
    }

    fn estimator_name(&self) -> &'static str {
        "identity"
    }
}

/// Oracle charging one winston per byte.
#[allow(dead_code)]
pub struct IdentityOracle;

#[async_trait]
impl PriceOracle for IdentityOracle {
    async fn fee_for_byte_count(&self, byte_count: ByteCount) -> PricingResult<Winston> {
        Ok(Winston::from(byte_count.get()))
    }
}

/// Community oracle returning a fixed tip, counting tip requests.
///
/// Without a recipient, recipient selection fails.
#[allow(dead_code)]
pub struct StubCommunityOracle {
    pub tip: Winston,
    pub recipient: Option<ArweaveAddress>,
    pub tip_requests: AtomicUsize,
}

#[allow(dead_code)]
impl StubCommunityOracle {
    pub fn with_tip(tip: u64) -> Arc<Self> {
        Arc::new(Self {
            tip: Winston::from(tip),
            recipient: Some(ArweaveAddress::parse(&"t".repeat(43)).unwrap()),
            tip_requests: AtomicUsize::new(0),
        })
    }

    pub fn without_recipient(tip: u64) -> Arc<Self> {
        Arc::new(Self {
            tip: Winston::from(tip),
            recipient: None,
            tip_requests: AtomicUsize::new(0),
        })
    }

    pub fn tip_requests(&self) -> usize {
        self.tip_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommunityOracle for StubCommunityOracle {
    async fn tip_for(&self, _base_fee: &Winston) -> PricingResult<Winston> {
        self.tip_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.tip.clone())
    }

    async fn select_tip_recipient(&self) -> PricingResult<ArweaveAddress> {
        self.recipient
            .clone()
            .ok_or_else(|| PricingError::CommunityTip("no recipients available".to_string()))
    }
}
