use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::Duration;
use weft_core::chunk::chunk_count;
use weft_core::{ByteCount, Winston};
use weft_pricing::{PriceEstimator, PriceOracle, PricingError, PricingResult};

/// Oracle charging `base + per_chunk × chunks`, counting every call.
///
/// An optional delay keeps requests in flight long enough for concurrent
/// callers to overlap.
#[allow(dead_code)]
pub struct CountingOracle {
    pub base: u64,
    pub per_chunk: u64,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl CountingOracle {
    pub fn linear(base: u64, per_chunk: u64) -> Arc<Self> {
        Arc::new(Self {
            base,
            per_chunk,
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn delayed(base: u64, per_chunk: u64, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            base,
            per_chunk,
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceOracle for CountingOracle {
    async fn fee_for_byte_count(&self, byte_count: ByteCount) -> PricingResult<Winston> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(Winston::from(
            self.base + self.per_chunk * chunk_count(byte_count),
        ))
    }
}

/// Oracle that fails its first `failures` calls, then behaves linearly.
#[allow(dead_code)]
pub struct FailingOracle {
    pub failures: usize,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FailingOracle {
    pub fn new(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceOracle for FailingOracle {
    async fn fee_for_byte_count(&self, byte_count: ByteCount) -> PricingResult<Winston> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(PricingError::Oracle("gateway unavailable".to_string()));
        }
        Ok(Winston::from(100 + 1000 * chunk_count(byte_count)))
    }
}

/// Estimator that always fails, counting attempts.
#[allow(dead_code)]
pub struct FailingEstimator {
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FailingEstimator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceEstimator for FailingEstimator {
    async fn base_fee(&self, _byte_count: ByteCount) -> PricingResult<Winston> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PricingError::Oracle("estimator offline".to_string()))
    }

    async fn byte_capacity(&self, _fee: &Winston) -> PricingResult<ByteCount> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PricingError::Oracle("estimator offline".to_string()))
    }

    fn estimator_name(&self) -> &'static str {
        "failing"
    }
}
