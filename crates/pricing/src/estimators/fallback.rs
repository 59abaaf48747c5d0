//! Ordered chain of estimators with permanent downgrade on failure.

use crate::error::{PricingError, PricingResult};
use crate::traits::PriceEstimator;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use weft_core::{ByteCount, Winston};

/// Tries estimators in order, moving to the next one whenever the current
/// one fails.
///
/// A failed estimator is never retried. Once every estimator has failed,
/// all calls return [`PricingError::Exhausted`].
pub struct FallbackPriceEstimator {
    estimators: Vec<Arc<dyn PriceEstimator>>,
    current: AtomicUsize,
}

impl FallbackPriceEstimator {
    pub fn new(estimators: Vec<Arc<dyn PriceEstimator>>) -> PricingResult<Self> {
        if estimators.is_empty() {
            return Err(PricingError::Config(
                "fallback estimator needs at least one strategy".to_string(),
            ));
        }
        Ok(Self {
            estimators,
            current: AtomicUsize::new(0),
        })
    }

    /// Name of the estimator currently in use, or `None` once exhausted.
    pub fn current_estimator_name(&self) -> Option<&'static str> {
        self.estimators
            .get(self.current.load(Ordering::Acquire))
            .map(|estimator| estimator.estimator_name())
    }

    async fn with_fallback<'a, T, F, Fut>(&'a self, operation: F) -> PricingResult<T>
    where
        F: Fn(&'a dyn PriceEstimator) -> Fut,
        Fut: Future<Output = PricingResult<T>>,
    {
        loop {
            let index = self.current.load(Ordering::Acquire);
            let Some(estimator) = self.estimators.get(index) else {
                return Err(PricingError::Exhausted {
                    attempted: self.estimators.len(),
                });
            };

            match operation(estimator.as_ref()).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(
                        estimator = estimator.estimator_name(),
                        error = %e,
                        "price estimator failed, falling back to next strategy"
                    );
                    // Another caller may already have advanced past this one.
                    let _ = self.current.compare_exchange(
                        index,
                        index + 1,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    );
                }
            }
        }
    }
}

#[async_trait]
impl PriceEstimator for FallbackPriceEstimator {
    async fn base_fee(&self, byte_count: ByteCount) -> PricingResult<Winston> {
        self.with_fallback(|estimator| estimator.base_fee(byte_count))
            .await
    }

    async fn byte_capacity(&self, fee: &Winston) -> PricingResult<ByteCount> {
        self.with_fallback(|estimator| estimator.byte_capacity(fee))
            .await
    }

    fn estimator_name(&self) -> &'static str {
        "fallback"
    }
}
