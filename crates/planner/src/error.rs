//! Planner error types.

use thiserror::Error;
use weft_core::ByteCount;
use weft_pricing::PricingError;

/// Planning and costing errors.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("max data item limit must be at least 2, got {0}")]
    InvalidDataItemLimit(u64),

    #[error("max bundle size must be greater than 0")]
    InvalidBundleSize,

    #[error(
        "{data_item_count} data items of {byte_count} bytes exceed the bundle limits of {max_data_item_limit} items and {max_bundle_size} bytes"
    )]
    ExceedsBundleLimits {
        byte_count: ByteCount,
        data_item_count: u64,
        max_bundle_size: ByteCount,
        max_data_item_limit: u64,
    },

    #[error(transparent)]
    Core(#[from] weft_core::Error),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Result type for planner operations.
pub type PlannerResult<T> = std::result::Result<T, PlannerError>;
