//! Pricing error types.

use thiserror::Error;

/// Price estimation errors.
///
/// Cloneable so a single in-flight oracle request can be awaited by many
/// callers.
#[derive(Clone, Debug, Error)]
pub enum PricingError {
    #[error("price oracle error: {0}")]
    Oracle(String),

    #[error("pricing data is not available after setup")]
    PricingDataNotReady,

    #[error("price could not be determined: all {attempted} estimation strategies failed")]
    Exhausted { attempted: usize },

    #[error("invalid sample volumes: {0}")]
    InvalidSampleVolumes(String),

    #[error("community tip error: {0}")]
    CommunityTip(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Core(String),
}

impl From<weft_core::Error> for PricingError {
    fn from(err: weft_core::Error) -> Self {
        PricingError::Core(err.to_string())
    }
}

/// Result type for pricing operations.
pub type PricingResult<T> = std::result::Result<T, PricingError>;
