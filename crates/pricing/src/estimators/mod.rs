//! Price estimation strategies.

pub mod chunk;
pub mod fallback;
pub mod network;
pub mod regression;

use crate::error::{PricingError, PricingResult};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Mutex, MutexGuard};
use weft_core::chunk::min_bytes_for_chunks;
use weft_core::{ByteCount, Winston};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("estimator mutex was poisoned, recovering with into_inner()");
        poisoned.into_inner()
    })
}

/// Conservative capacity of `fee` under a linear per-chunk price model.
///
/// Returns the smallest byte count that occupies as many chunks as `fee`
/// affords, so the capacity of the fee for `b` bytes never exceeds `b`.
/// Fees below the one-chunk price buy nothing, and so does any fee under a
/// zero marginal price, where every size costs the same.
pub(crate) fn linear_byte_capacity(
    fee: &Winston,
    base_fee: &Winston,
    one_chunk_fee: &Winston,
    per_chunk_fee: &Winston,
) -> ByteCount {
    if fee < one_chunk_fee || per_chunk_fee.is_zero() {
        return ByteCount::ZERO;
    }
    let Ok(spendable) = fee.minus(base_fee) else {
        return ByteCount::ZERO;
    };
    let chunks = spendable.as_biguint() / per_chunk_fee.as_biguint();
    let chunks = u64::try_from(chunks).unwrap_or(u64::MAX);
    min_bytes_for_chunks(chunks)
}

type PendingSetup<T> = Shared<BoxFuture<'static, PricingResult<T>>>;

/// One-time pricing setup shared by concurrent callers.
///
/// While a refresh is in flight every caller awaits the same future, so the
/// oracle sees exactly one round of requests. The result is kept until the
/// next explicit refresh.
pub(crate) struct MemoizedSetup<T> {
    pending: Mutex<Option<PendingSetup<T>>>,
    value: Mutex<Option<T>>,
}

impl<T> MemoizedSetup<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            pending: Mutex::new(None),
            value: Mutex::new(None),
        }
    }

    /// The most recent setup result, if any.
    pub(crate) fn current(&self) -> Option<T> {
        lock(&self.value).clone()
    }

    /// Run `start` unless a refresh is already in flight, then await it.
    pub(crate) async fn refresh<F>(&self, start: F) -> PricingResult<T>
    where
        F: FnOnce() -> BoxFuture<'static, PricingResult<T>>,
    {
        let pending = {
            let mut slot = lock(&self.pending);
            match slot.as_ref() {
                Some(pending) => pending.clone(),
                None => {
                    let pending = start().shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        let result = pending.clone().await;

        if let Ok(value) = &result {
            *lock(&self.value) = Some(value.clone());
        }
        let mut slot = lock(&self.pending);
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&pending)) {
            *slot = None;
        }
        result
    }

    /// The current value, running setup first if none exists yet.
    pub(crate) async fn get_or_refresh<F>(&self, start: F) -> PricingResult<T>
    where
        F: FnOnce() -> BoxFuture<'static, PricingResult<T>>,
    {
        if let Some(value) = self.current() {
            return Ok(value);
        }
        self.refresh(start).await?;
        self.current().ok_or(PricingError::PricingDataNotReady)
    }
}
