//! Estimator that asks the oracle for every distinct chunk count.

use super::{linear_byte_capacity, lock};
use crate::error::PricingResult;
use crate::traits::{PriceEstimator, PriceOracle};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use weft_core::chunk::{bytes_for_chunks, chunk_count};
use weft_core::{ByteCount, Winston};

type PendingFee = Shared<BoxFuture<'static, PricingResult<Winston>>>;

/// Prices byte counts by querying the oracle once per chunk count.
///
/// Byte counts are rounded up to whole chunks, so every byte count within
/// the same chunk count shares one cached answer. The cache holds in-flight
/// requests, so concurrent callers asking for the same chunk count share a
/// single oracle call. Failed requests are evicted and retried next time.
pub struct NetworkPriceEstimator {
    oracle: Arc<dyn PriceOracle>,
    cache: Mutex<HashMap<u64, PendingFee>>,
}

impl NetworkPriceEstimator {
    pub fn new(oracle: Arc<dyn PriceOracle>) -> Self {
        Self {
            oracle,
            cache: Mutex::new(HashMap::new()),
        }
    }

    async fn fee_for_chunks(&self, chunks: u64) -> PricingResult<Winston> {
        let pending = {
            let mut cache = lock(&self.cache);
            cache
                .entry(chunks)
                .or_insert_with(|| {
                    tracing::debug!(chunks, "querying price oracle");
                    let oracle = Arc::clone(&self.oracle);
                    async move { oracle.fee_for_byte_count(bytes_for_chunks(chunks)).await }
                        .boxed()
                        .shared()
                })
                .clone()
        };

        let result = pending.clone().await;

        if result.is_err() {
            let mut cache = lock(&self.cache);
            if cache
                .get(&chunks)
                .is_some_and(|current| current.ptr_eq(&pending))
            {
                cache.remove(&chunks);
            }
        }
        result
    }
}

#[async_trait]
impl PriceEstimator for NetworkPriceEstimator {
    async fn base_fee(&self, byte_count: ByteCount) -> PricingResult<Winston> {
        self.fee_for_chunks(chunk_count(byte_count)).await
    }

    async fn byte_capacity(&self, fee: &Winston) -> PricingResult<ByteCount> {
        let base_fee = self.fee_for_chunks(0).await?;
        let one_chunk_fee = self.fee_for_chunks(1).await?;
        let per_chunk_fee = one_chunk_fee.minus(&base_fee)?;
        Ok(linear_byte_capacity(
            fee,
            &base_fee,
            &one_chunk_fee,
            &per_chunk_fee,
        ))
    }

    fn estimator_name(&self) -> &'static str {
        "network"
    }
}
